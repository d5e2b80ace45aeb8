use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indexmap::IndexMap;
use log::info;
use netpush::{FailurePolicy, Runner, SessionFactory, ValidationArgs, ValidatorRegistry};

use crate::args::{ConnectionArgs, GlobalArgs, HostArgs};
use crate::cmd::Run;
use crate::output::Output;

const HEADING: Option<&str> = Some("Validation Options");

/// Run a read-only command and optionally validate the output.
#[derive(Debug, Args)]
pub struct CommandArgs {
    #[command(flatten)]
    pub hosts: HostArgs,

    #[command(flatten)]
    pub conn: ConnectionArgs,

    /// What to do when one host fails
    #[arg(long, default_value_t = FailurePolicy::FailFast)]
    pub policy: FailurePolicy,

    /// Validator to run over all outputs, e.g. `contains`
    #[arg(long, help_heading = HEADING)]
    pub validate_module: Option<String>,

    /// Validator argument as key=value; repeatable
    #[arg(long = "validation-arg", value_parser = parse_key_value, help_heading = HEADING)]
    pub validation_args: Vec<(String, String)>,

    /// YAML map or CSV file of validator arguments
    #[arg(long, conflicts_with = "validation_args", help_heading = HEADING)]
    pub validation_args_file: Option<PathBuf>,

    /// Command to run; must start with `show`
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub command: Vec<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

impl CommandArgs {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    fn validation_args(&self) -> Result<ValidationArgs> {
        match &self.validation_args_file {
            Some(path) => Ok(ValidationArgs::from_file(path)?),
            None => Ok(ValidationArgs::Inline(
                self.validation_args.iter().cloned().collect::<IndexMap<_, _>>(),
            )),
        }
    }
}

impl Run for CommandArgs {
    async fn run<F: SessionFactory>(&self, factory: F, global: &GlobalArgs) -> Result<Output> {
        let command = self.command_line();
        netpush::command::validate_command(&command)?;

        let registry = ValidatorRegistry::with_builtins();
        let validator = match &self.validate_module {
            Some(reference) => Some((registry.resolve(reference)?, self.validation_args()?)),
            None => None,
        };

        let hosts = self.hosts.resolve().context("unable to resolve hosts")?;
        let params = self.conn.params("", global.session_verbose());

        let results = Runner::new(factory)
            .policy(self.policy)
            .run_command(&hosts, &params, &command)
            .await?;

        let Some((validator, args)) = validator else {
            return Ok(Output::command(&results));
        };
        let verdict = validator.validate(&results, &args)?;
        info!("validation {}: {}", if verdict.pass { "passed" } else { "failed" }, verdict.message);
        Ok(Output::validated(&results, verdict))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: CommandArgs,
    }

    fn parse(extra: &[&str]) -> CommandArgs {
        let mut argv = vec!["netpush", "--host", "r1", "-u", "admin"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_inline_validation_args() {
        let args = parse(&[
            "--validate-module",
            "contains",
            "--validation-arg",
            "r1=Established",
            "--validation-arg",
            "*=BGP",
            "show",
            "bgp",
            "summary",
        ]);
        assert_eq!(args.command_line(), "show bgp summary");
        assert_eq!(args.policy, FailurePolicy::FailFast);

        let ValidationArgs::Inline(map) = args.validation_args().unwrap() else {
            panic!("expected inline args");
        };
        assert_eq!(map["r1"], "Established");
        assert_eq!(map["*"], "BGP");
    }

    #[test]
    fn test_bad_key_value() {
        let parsed = Harness::try_parse_from([
            "netpush",
            "--host",
            "r1",
            "-u",
            "admin",
            "--validation-arg",
            "nope",
            "show",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_policy_flag() {
        let args = parse(&["--policy", "best-effort", "show", "clock"]);
        assert_eq!(args.policy, FailurePolicy::BestEffort);
    }
}
