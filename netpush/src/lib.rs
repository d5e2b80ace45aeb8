//! # netpush
//!
//! Read-only command execution and configuration install for network
//! devices over an SSH CLI session.
//!
//! ## Features
//!
//! - Async SSH sessions via russh (the `ssh` cargo feature, on by default)
//! - `show`-only command execution, refused before any device I/O otherwise
//! - Line-by-line config push with commit on candidate-config platforms
//! - Unified diffs of the running config before and after a push
//! - Host lists from delimited files and a closed set of output validators
//! - Multi-vendor prompts and privilege navigation (IOS, JunOS, VyOS)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "ssh")]
//! use indexmap::IndexSet;
//! # #[cfg(feature = "ssh")]
//! use netpush::{ConnectionParams, FailurePolicy, Runner, SshSessionFactory};
//!
//! # #[cfg(feature = "ssh")]
//! #[tokio::main]
//! async fn main() -> Result<(), netpush::Error> {
//!     netpush::check_dependencies()?;
//!
//!     let params = ConnectionParams::new("192.168.1.1", "admin")
//!         .password("secret")
//!         .device_type("cisco_ios");
//!     let hosts = IndexSet::from(["192.168.1.1".to_string()]);
//!
//!     let runner = Runner::new(SshSessionFactory).policy(FailurePolicy::BestEffort);
//!     for (host, result) in runner.run_command(&hosts, &params, "show version").await? {
//!         println!("{host}: {}", result.raw_output());
//!     }
//!     Ok(())
//! }
//! # #[cfg(not(feature = "ssh"))]
//! # fn main() {}
//! ```

pub mod channel;
pub mod command;
pub mod diff;
pub mod driver;
pub mod error;
pub mod hosts;
pub mod install;
pub mod platform;
pub mod runner;
pub mod session;
pub mod transport;
pub mod validate;

pub use command::CommandResult;
pub use diff::{DiffReport, diff};
pub use driver::{Driver, Response};
pub use error::{Error, Result};
pub use hosts::HostFile;
pub use install::{ConfigApplyResult, ConfigFile};
pub use platform::{PlatformDefinition, PlatformRegistry, requires_commit};
pub use runner::{FailurePolicy, Runner};
pub use session::{ConnectionParams, OpContext, Session, SessionFactory, check_dependencies};
#[cfg(feature = "ssh")]
pub use session::SshSessionFactory;
pub use transport::{AuthMethod, HostKeyVerification};
pub use validate::{Validation, ValidationArgs, Validator, ValidatorRegistry};
