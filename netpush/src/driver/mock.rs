//! Scripted in-memory driver for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Driver, Response};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::{PlatformDefinition, PlatformRegistry};

/// Records everything sent and answers from a script.
pub(crate) struct MockDriver {
    platform: PlatformDefinition,
    /// Canned output per command; unknown commands answer with "".
    outputs: HashMap<String, Vec<String>>,
    /// Commands that time out.
    stalls: Vec<String>,
    /// Everything sent, in order, including config lines and commits.
    pub sent: Vec<String>,
    pub open: bool,
    pub closed: bool,
    pub in_config: bool,
    pub fail_open: bool,
    pub fail_config: bool,
    pub fail_exit: bool,
    /// Session lifecycle events, shareable with a factory.
    pub journal: Arc<Mutex<Vec<String>>>,
}

impl MockDriver {
    pub fn new(device_type: &str) -> Self {
        let platform = PlatformRegistry::lookup(device_type)
            .unwrap_or_else(|_| PlatformDefinition::new(device_type));
        Self {
            platform,
            outputs: HashMap::new(),
            stalls: vec![],
            sent: vec![],
            open: false,
            closed: false,
            in_config: false,
            fail_open: false,
            fail_config: false,
            fail_exit: false,
            journal: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Answer `command` with `output`; repeated calls queue answers in order.
    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.outputs
            .entry(command.to_string())
            .or_default()
            .push(output.to_string());
        self
    }

    /// Make `command` time out.
    pub fn stall(mut self, command: &str) -> Self {
        self.stalls.push(command.to_string());
        self
    }

    pub fn commits(&self) -> usize {
        self.sent
            .iter()
            .filter(|c| **c == self.platform.commit_command)
            .count()
    }

    fn answer(&mut self, command: &str) -> String {
        match self.outputs.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue.first().cloned().unwrap_or_default(),
            None => String::new(),
        }
    }
}

impl Driver for MockDriver {
    async fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(ChannelError::Closed.into());
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        self.closed = true;
        self.journal.lock().unwrap().push("close".to_string());
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        if !self.open {
            return Err(DriverError::NotConnected.into());
        }
        self.sent.push(command.to_string());
        if self.stalls.iter().any(|c| c == command) {
            return Err(ChannelError::PatternTimeout(Duration::from_secs(30)).into());
        }

        let result = self.answer(command);
        let response =
            Response::new(command, result.clone(), result.clone(), "r1#", Duration::ZERO);
        Ok(match self.platform.failure_in(&result) {
            Some(pattern) => {
                let pattern = pattern.to_string();
                response.with_failure(pattern)
            }
            None => response,
        })
    }

    async fn send_config(
        &mut self,
        lines: &[&str],
        exit_config_mode: bool,
    ) -> Result<Vec<Response>> {
        if self.fail_config {
            return Err(ChannelError::Closed.into());
        }
        self.in_config = true;
        let mut responses = Vec::with_capacity(lines.len());
        for line in lines {
            responses.push(self.send_command(line).await?);
        }
        if exit_config_mode {
            self.exit_config_mode().await?;
        }
        Ok(responses)
    }

    async fn commit(&mut self) -> Result<Response> {
        let command = self.platform.commit_command.clone();
        self.send_command(&command).await
    }

    async fn exit_config_mode(&mut self) -> Result<()> {
        if self.fail_exit {
            return Err(ChannelError::Closed.into());
        }
        self.in_config = false;
        Ok(())
    }

    async fn acquire_privilege(&mut self, _privilege: &str) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn current_privilege(&self) -> Option<&str> {
        Some(if self.in_config { "configuration" } else { "privilege_exec" })
    }

    fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }
}
