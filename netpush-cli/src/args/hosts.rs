use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indexmap::IndexSet;
use netpush::HostFile;

const HEADING: Option<&str> = Some("Target Options");

/// Which hosts to run against: one `--host`, or every host in a file.
#[derive(Debug, Args, Clone)]
pub struct HostArgs {
    /// Single target host
    #[arg(
        long,
        conflicts_with = "host_file",
        required_unless_present = "host_file",
        help_heading = HEADING
    )]
    pub host: Option<String>,

    /// Delimited file with one host per line
    #[arg(long, help_heading = HEADING)]
    pub host_file: Option<String>,

    /// Directory holding the host file
    #[arg(long, requires = "host_file", help_heading = HEADING)]
    pub root_path: Option<PathBuf>,

    /// Field delimiter in the host file
    #[arg(long, default_value = ",", help_heading = HEADING)]
    pub delimiter: String,

    /// Zero-based field holding the host
    #[arg(long, default_value_t = 0, help_heading = HEADING)]
    pub key: usize,
}

impl HostArgs {
    pub fn resolve(&self) -> Result<IndexSet<String>> {
        if let Some(host) = &self.host {
            return Ok(IndexSet::from([host.clone()]));
        }

        let Some(filename) = &self.host_file else {
            anyhow::bail!("either --host or --host-file is required");
        };
        let mut file = HostFile::new(filename.clone())
            .delimiter(self.delimiter.clone())
            .key(self.key);
        if let Some(root) = &self.root_path {
            file = file.root_path(root.clone());
        }
        Ok(file.resolve()?)
    }
}
