use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use env_logger::{Env, Target};
use log::debug;

const HEADING: Option<&str> = Some("Global Options");

/// Global arguments that apply to every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Append logs to this file instead of stderr
    #[arg(long, help_heading = HEADING, global = true)]
    pub log_file: Option<PathBuf>,

    /// More logging; twice also logs device traffic
    #[arg(short, long, action = ArgAction::Count, help_heading = HEADING, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Default log filter; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Whether device traffic is logged at info.
    pub fn session_verbose(&self) -> bool {
        self.verbose >= 2
    }

    /// Initializes [`env_logger`], writing to the log file when one is set.
    pub fn init_logging(&self) -> Result<()> {
        let mut builder =
            env_logger::Builder::from_env(Env::default().default_filter_or(self.log_filter()));

        if let Some(path) = &self.log_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("unable to open log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }

        builder.try_init().context("logger already initialized")?;
        debug!("Initialized logging");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        global: GlobalArgs,
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Harness::parse_from(["netpush"]).global;
        assert_eq!(args.log_filter(), "warn");
        assert!(!args.session_verbose());

        let args = Harness::parse_from(["netpush", "-vv", "--log-file", "/tmp/netpush.log"]).global;
        assert_eq!(args.log_filter(), "debug");
        assert!(args.session_verbose());
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/netpush.log")));
    }
}
