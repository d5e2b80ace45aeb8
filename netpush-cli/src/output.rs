//! JSON documents printed on stdout.

use indexmap::IndexMap;
use netpush::{CommandResult, ConfigApplyResult, Validation};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Raw output of a command, per host.
    Command {
        changed: bool,
        warnings: Vec<String>,
        stdout_lines: IndexMap<String, String>,
    },
    /// Verdict of a validator over the command output.
    Validated {
        changed: bool,
        warnings: Vec<String>,
        msg: Validation,
    },
    /// Result of a config install.
    Install {
        changed: bool,
        warnings: Vec<String>,
        stdout_lines: Vec<String>,
        msg: String,
    },
    Failed {
        failed: bool,
        msg: String,
    },
}

impl Output {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed {
            failed: true,
            msg: msg.into(),
        }
    }

    pub fn command(results: &IndexMap<String, CommandResult>) -> Self {
        Self::Command {
            changed: false,
            warnings: failure_warnings(results),
            stdout_lines: results
                .iter()
                .map(|(host, result)| (host.clone(), result.raw_output().to_string()))
                .collect(),
        }
    }

    pub fn validated(results: &IndexMap<String, CommandResult>, verdict: Validation) -> Self {
        Self::Validated {
            changed: true,
            warnings: failure_warnings(results),
            msg: verdict,
        }
    }

    pub fn install(result: &ConfigApplyResult) -> Self {
        Self::Install {
            changed: result.changed,
            warnings: result
                .rejected_lines
                .iter()
                .map(|line| format!("device rejected {line:?}"))
                .collect(),
            stdout_lines: result.output_lines().into_iter().map(str::to_string).collect(),
            msg: result.message.clone(),
        }
    }

    /// Whether the process should exit non-zero.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Failed { .. } => true,
            Self::Validated { msg, .. } => !msg.pass,
            Self::Command { .. } | Self::Install { .. } => false,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"failed": true, "msg": "unable to encode output: {e}"}}"#)
        })
    }
}

fn failure_warnings(results: &IndexMap<String, CommandResult>) -> Vec<String> {
    results
        .values()
        .filter_map(|r| r.error_detail().map(|detail| format!("{}: {detail}", r.host())))
        .collect()
}
