//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::generic::GenericDriver;
use crate::error::{PlatformError, Result};
use crate::platform::{DEFAULT_DEVICE_TYPE, PlatformRegistry};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netpush::driver::{Driver, DriverBuilder};
///
/// # async fn example() -> Result<(), netpush::Error> {
/// let mut driver = DriverBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .platform("cisco_ios")
///     .build()?;
/// driver.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    platform_name: Option<String>,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    verbose: bool,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            platform_name: None,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            verbose: false,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set the authentication method directly.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Set the platform name (default: "cisco_ios").
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform_name = Some(platform.into());
        self
    }

    /// Set the connection and read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Log device traffic at info instead of debug.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<GenericDriver> {
        let username = self.username.ok_or_else(|| PlatformError::InvalidDefinition {
            message: "Username is required".to_string(),
        })?;

        let platform =
            PlatformRegistry::lookup(self.platform_name.as_deref().unwrap_or(DEFAULT_DEVICE_TYPE))?;

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        GenericDriver::new(ssh_config, platform, self.verbose)
    }
}
