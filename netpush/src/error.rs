//! Error types for netpush.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for netpush operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Rejected input (command policy, validator references)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Opening a session to a host failed
    #[error("Connection to {host} failed: {source}")]
    Connection {
        host: String,
        #[source]
        source: Box<Error>,
    },

    /// A command was rejected by the device or timed out
    #[error("Command '{command}' failed on {host}: {reason}")]
    Execution {
        host: String,
        command: String,
        reason: String,
    },

    /// Pushing configuration to a device failed
    #[error("Config apply failed on {host}: {reason}")]
    Apply { host: String, reason: String },

    /// Local file I/O failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A required capability was compiled out
    #[error("Required dependency unavailable: {feature}")]
    Dependency { feature: String },
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts a run regardless of the failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Dependency { .. })
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[cfg(feature = "ssh")]
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key does not match the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not present in known_hosts (strict mode)
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(std::time::Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[cfg(feature = "ssh")]
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// No platform registered under this device type
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// A platform with this name is already registered
    #[error("Platform '{name}' already registered")]
    AlreadyRegistered { name: String },
}

/// Input rejected before any device I/O.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Only read-only commands may be executed
    #[error("Command '{command}' does not start with 'show'")]
    NotReadOnly { command: String },

    /// Validator reference is not a dotted identifier path
    #[error("Malformed validator reference '{reference}'")]
    MalformedValidator { reference: String },

    /// Validator reference names nothing in the registry
    #[error("Unknown validator '{name}'")]
    UnknownValidator { name: String },

    /// Validation arguments could not be used
    #[error("Invalid validation arguments: {message}")]
    InvalidArgs { message: String },
}

/// Result type alias using netpush's Error.
pub type Result<T> = std::result::Result<T, Error>;
