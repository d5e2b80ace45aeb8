//! Response type for command execution results.

use std::time::Duration;

use crate::error::{Error, Result};

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if a failure pattern was seen in the output.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a device-reported failure into [`Error::Execution`].
    pub fn ensure_success(self, host: &str) -> Result<Self> {
        match self.failure_message {
            None => Ok(self),
            Some(message) => Err(Error::Execution {
                host: host.to_string(),
                command: self.command,
                reason: format!("device reported '{message}'"),
            }),
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_success_passes_through() {
        let response =
            Response::new("show clock", "12:00", "show clock\n12:00\nr1#", "r1#", Duration::ZERO);
        let response = response.ensure_success("r1").unwrap();
        assert_eq!(response.to_string(), "12:00");
    }

    #[test]
    fn test_ensure_success_maps_failure() {
        let response = Response::new("show ip rout", "% Invalid input", "", "r1#", Duration::ZERO)
            .with_failure("% Invalid input");
        assert!(!response.is_success());

        let err = response.ensure_success("r1").unwrap_err();
        match err {
            Error::Execution { host, command, reason } => {
                assert_eq!(host, "r1");
                assert_eq!(command, "show ip rout");
                assert!(reason.contains("% Invalid input"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
