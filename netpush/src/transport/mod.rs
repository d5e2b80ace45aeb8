//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management,
//! handling connection setup, authentication, and channel creation.
//! The connection itself is only compiled with the `ssh` feature; the
//! configuration types are always available.

pub mod config;
#[cfg(feature = "ssh")]
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
#[cfg(feature = "ssh")]
pub use ssh::SshTransport;
