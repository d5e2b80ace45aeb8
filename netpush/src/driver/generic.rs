//! Generic driver implementation that works with any platform.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{Level, debug, log};
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use super::Driver;
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::{PtyChannel, last_line};
use crate::error::{DriverError, PlatformError, Result};
use crate::platform::{DefaultBehavior, PlatformDefinition, VendorBehavior};
use crate::transport::SshTransport;
use crate::transport::config::{AuthMethod, SshConfig};

/// Bytes from the end of the output searched for a prompt.
const SEARCH_DEPTH: usize = 1000;

/// Generic driver that works with any platform definition.
///
/// Handles:
/// - SSH transport and PTY channel management
/// - Command execution with prompt detection
/// - Privilege level navigation
/// - Vendor-specific output normalization
pub struct GenericDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    behavior: Arc<dyn VendorBehavior>,

    /// SSH transport (None when disconnected).
    transport: Option<SshTransport>,

    /// Shell channel on the transport.
    channel: Option<PtyChannel>,

    privilege_manager: PrivilegeManager,
    timeout: Duration,

    /// Combined prompt pattern for all privilege levels.
    prompt_pattern: Regex,

    /// Level used for per-command traffic logs.
    io_level: Level,
}

impl std::fmt::Debug for GenericDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericDriver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GenericDriver {
    /// Create a new generic driver.
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition, verbose: bool) -> Result<Self> {
        let timeout = ssh_config.timeout;
        let privilege_manager = PrivilegeManager::new(platform.privilege_levels.clone());
        let behavior = platform
            .behavior
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultBehavior));
        let prompt_pattern = Self::build_combined_pattern(&platform)?;

        Ok(Self {
            ssh_config,
            platform,
            behavior,
            transport: None,
            channel: None,
            privilege_manager,
            timeout,
            prompt_pattern,
            io_level: if verbose { Level::Info } else { Level::Debug },
        })
    }

    /// Build a regex that matches any privilege level's prompt.
    fn build_combined_pattern(platform: &PlatformDefinition) -> Result<Regex> {
        let combined = platform
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.prompt.as_str()))
            .collect::<Vec<_>>()
            .join("|");

        if combined.is_empty() {
            return Err(PlatformError::InvalidDefinition {
                message: format!("platform '{}' defines no privilege levels", platform.name),
            }
            .into());
        }

        Regex::new(&combined).map_err(|e| {
            PlatformError::InvalidDefinition {
                message: format!("combined prompt pattern: {e}"),
            }
            .into()
        })
    }

    /// Read until any prompt is matched; returns (output, prompt).
    async fn read_until_prompt(&mut self) -> Result<(String, String)> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let data = channel
            .read_until_pattern(&self.prompt_pattern, self.timeout)
            .await?;

        let prompt = last_line(&data);
        self.privilege_manager.update_from_prompt(&prompt);
        Ok((String::from_utf8_lossy(&data).into_owned(), prompt))
    }

    /// Send `input` and wait for either a password prompt or a device prompt.
    ///
    /// Answers the password prompt when one shows up.
    async fn send_with_auth(&mut self, input: &str, auth_prompt: &Regex) -> Result<()> {
        let either = Regex::new(&format!(
            "(?:{})|(?:{})",
            auth_prompt.as_str(),
            self.prompt_pattern.as_str()
        ))
        .map_err(|e| DriverError::InvalidConfig {
            message: format!("auth prompt pattern: {e}"),
        })?;

        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        channel.send(input).await?;
        let data = channel.read_until_pattern(&either, self.timeout).await?;

        if auth_prompt.is_match(last_line(&data).as_bytes()) {
            let secret = match &self.ssh_config.auth {
                AuthMethod::Password(pwd) => pwd.expose_secret().to_string(),
                _ => String::new(),
            };
            channel.send(&secret).await?;
            self.read_until_prompt().await?;
        } else {
            self.privilege_manager.update_from_prompt(&last_line(&data));
        }
        Ok(())
    }
}

impl Driver for GenericDriver {
    async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(self.ssh_config.clone()).await?;
        let channel = transport.open_channel(SEARCH_DEPTH).await?;
        self.transport = Some(transport);
        self.channel = Some(channel);

        let (_, prompt) = self.read_until_prompt().await?;
        debug!("{}: initial prompt {:?}", self.ssh_config.host, prompt);

        let default = self.platform.default_privilege.clone();
        if !default.is_empty() {
            self.acquire_privilege(&default).await?;
        }

        for cmd in self.platform.on_open_commands.clone() {
            self.send_command(&cmd).await?;
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.channel = None;

        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let start = Instant::now();

        log!(self.io_level, "{} >> {}", self.ssh_config.host, command);
        channel.send(command).await?;

        let data = channel
            .read_until_pattern(&self.prompt_pattern, self.timeout)
            .await?;
        let elapsed = start.elapsed();

        let raw_result = String::from_utf8_lossy(&data).into_owned();
        let prompt = last_line(&data);
        self.privilege_manager.update_from_prompt(&prompt);

        let result = self.behavior.normalize_output(&raw_result, command);
        log!(
            self.io_level,
            "{} << {} bytes in {:?}, prompt {:?}",
            self.ssh_config.host,
            result.len(),
            elapsed,
            prompt
        );

        let failure = self
            .behavior
            .detect_failure(&result)
            .or_else(|| self.platform.failure_in(&result).map(str::to_string));

        let response = Response::new(command, result, raw_result, prompt, elapsed);
        Ok(match failure {
            Some(message) => response.with_failure(message),
            None => response,
        })
    }

    async fn send_config(
        &mut self,
        lines: &[&str],
        exit_config_mode: bool,
    ) -> Result<Vec<Response>> {
        let config_privilege = self.platform.config_privilege.clone();
        self.acquire_privilege(&config_privilege).await?;

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
        let default = self.platform.default_privilege.clone();
        self.acquire_privilege(&default).await
    }

    async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        let current = self
            .privilege_manager
            .current()
            .map(|l| l.name.clone())
            .unwrap_or_default();

        if current == target {
            return Ok(());
        }

        let path = self.privilege_manager.find_path(&current, target)?;

        for step in path.windows(2) {
            let (from, to) = (&step[0], &step[1]);
            let transition = self
                .privilege_manager
                .get_transition(from, to)
                .ok_or_else(|| DriverError::NoPrivilegePath {
                    from: from.clone(),
                    to: to.clone(),
                })?;

            debug!("{}: {} -> {} via {:?}", self.ssh_config.host, from, to, transition.command);

            match &transition.auth_prompt {
                Some(auth_prompt) => self.send_with_auth(&transition.command, auth_prompt).await?,
                None => {
                    let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
                    channel.send(&transition.command).await?;
                    self.read_until_prompt().await?;
                }
            }

            let reached = self.privilege_manager.current().map(|l| l.name.as_str());
            if reached != Some(to.as_str()) {
                return Err(DriverError::PrivilegeAcquisitionFailed { target: to.clone() }.into());
            }
        }

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn current_privilege(&self) -> Option<&str> {
        self.privilege_manager.current().map(|l| l.name.as_str())
    }

    fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }
}
