mod command;
mod install;

use anyhow::Result;
use clap::{Parser, Subcommand};
use netpush::SessionFactory;

use crate::args::GlobalArgs;
use crate::output::Output;

/// Run read-only commands on network devices or push configuration files
#[derive(Debug, Parser)]
#[command(name = "netpush", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Subcommands implement [`Run`] against any session factory.
pub trait Run {
    async fn run<F: SessionFactory>(&self, factory: F, global: &GlobalArgs) -> Result<Output>;
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one `show` command on one or more hosts
    Command(command::CommandArgs),
    /// Push a configuration file to one host
    InstallConfig(install::InstallArgs),
}

impl Run for Command {
    async fn run<F: SessionFactory>(&self, factory: F, global: &GlobalArgs) -> Result<Output> {
        match self {
            Command::Command(args) => args.run(factory, global).await,
            Command::InstallConfig(args) => args.run(factory, global).await,
        }
    }
}

/// Checks the build has a transport, then runs the chosen subcommand.
pub async fn run(cli: &Cli) -> Result<Output> {
    netpush::check_dependencies()?;
    dispatch(cli).await
}

#[cfg(feature = "ssh")]
async fn dispatch(cli: &Cli) -> Result<Output> {
    cli.command.run(netpush::SshSessionFactory, &cli.global).await
}

#[cfg(not(feature = "ssh"))]
async fn dispatch(_cli: &Cli) -> Result<Output> {
    anyhow::bail!("netpush was built without a session transport")
}
