//! Read-only command execution.

use log::{debug, info};
use serde::Serialize;

use crate::driver::Driver;
use crate::error::{Error, Result, ValidationError};
use crate::session::Session;

/// Every command accepted by [`execute`] starts with this literal.
pub const READ_ONLY_PREFIX: &str = "show";

/// Reject anything that is not a literal `show` command.
///
/// The check is case-sensitive and does not trim, so `" show version"` and
/// `"SHOW version"` are both refused.
pub fn validate_command(command: &str) -> Result<()> {
    if command.starts_with(READ_ONLY_PREFIX) {
        Ok(())
    } else {
        Err(ValidationError::NotReadOnly {
            command: command.to_string(),
        }
        .into())
    }
}

/// Run one read-only command and return the device output verbatim.
///
/// Nothing is sent when the command fails [`validate_command`].
pub async fn execute<D: Driver>(session: &mut Session<D>, command: &str) -> Result<String> {
    validate_command(command)?;

    let ctx = session.context().clone();
    info!("{ctx} executing {command:?}");

    let response = session
        .driver_mut()
        .send_command(command)
        .await
        .map_err(|e| Error::Execution {
            host: ctx.host.clone(),
            command: command.to_string(),
            reason: e.to_string(),
        })?
        .ensure_success(&ctx.host)?;

    debug!("{ctx} {} bytes of output in {:?}", response.result.len(), response.elapsed);
    Ok(response.result)
}

/// Outcome of one command on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    host: String,
    raw_output: String,
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
}

impl CommandResult {
    pub fn ok(host: impl Into<String>, raw_output: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            raw_output: raw_output.into(),
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failed(host: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            raw_output: String::new(),
            succeeded: false,
            error_detail: Some(error_detail.into()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// Output split into lines, as reported to callers.
    pub fn output_lines(&self) -> Vec<&str> {
        self.raw_output.lines().collect()
    }
}
