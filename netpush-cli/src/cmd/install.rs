use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use netpush::{Runner, SessionFactory};

use crate::args::{ConnectionArgs, GlobalArgs};
use crate::cmd::Run;
use crate::output::Output;

/// Push a configuration file, committing where the platform needs it.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Target host
    #[arg(long)]
    pub host: String,

    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// Configuration file, one line per CLI command
    #[arg(long)]
    pub file: PathBuf,

    /// Write a diff of the running config before and after to this file
    #[arg(long)]
    pub diff_file: Option<PathBuf>,
}

impl Run for InstallArgs {
    async fn run<F: SessionFactory>(&self, factory: F, global: &GlobalArgs) -> Result<Output> {
        let params = self.conn.params(&self.host, global.session_verbose());
        let result = Runner::new(factory)
            .install_config(&params, &self.file, self.diff_file.as_deref())
            .await?;
        Ok(Output::install(&result))
    }
}
