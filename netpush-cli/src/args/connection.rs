use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use netpush::{ConnectionParams, HostKeyVerification};
use netpush::platform::DEFAULT_DEVICE_TYPE;

const HEADING: Option<&str> = Some("Connection Options");

/// How to treat the device's SSH host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostKeyMode {
    /// Only connect to hosts already in known_hosts
    Strict,
    /// Remember unknown hosts, reject changed keys
    AcceptNew,
    /// Skip host key checks
    Disabled,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::Disabled => HostKeyVerification::Disabled,
        }
    }
}

/// Arguments describing how to log in to a device.
#[derive(Debug, Args, Clone)]
pub struct ConnectionArgs {
    /// Login username
    #[arg(short = 'u', long, env = "USER", help_heading = HEADING)]
    pub user: String,

    /// Login password
    #[arg(
        long,
        env = "NETPUSH_PASSWORD",
        hide_env_values = true,
        conflicts_with = "key_file",
        help_heading = HEADING
    )]
    pub password: Option<String>,

    /// Private key for key-based authentication
    #[arg(long, help_heading = HEADING)]
    pub key_file: Option<PathBuf>,

    /// Platform tag of the device
    #[arg(long, default_value = DEFAULT_DEVICE_TYPE, help_heading = HEADING)]
    pub device_type: String,

    /// SSH port
    #[arg(long, default_value_t = 22, help_heading = HEADING)]
    pub port: u16,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 30, help_heading = HEADING)]
    pub timeout: u64,

    /// Host key checking
    #[arg(long, value_enum, default_value = "accept-new", help_heading = HEADING)]
    pub host_key: HostKeyMode,

    /// known_hosts file to use instead of ~/.ssh/known_hosts
    #[arg(long, help_heading = HEADING)]
    pub known_hosts: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Connection parameters for `host`.
    pub fn params(&self, host: &str, verbose: bool) -> ConnectionParams {
        let mut params = ConnectionParams::new(host, self.user.clone())
            .device_type(self.device_type.clone())
            .port(self.port)
            .timeout(Duration::from_secs(self.timeout))
            .host_key_verification(self.host_key.into())
            .verbose(verbose);

        if let Some(path) = &self.known_hosts {
            params = params.known_hosts(path.clone());
        }
        if let Some(password) = &self.password {
            params = params.password(password.clone());
        } else if let Some(key_file) = &self.key_file {
            params = params.key_file(key_file.clone());
        }
        params
    }
}
