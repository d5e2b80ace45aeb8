//! Channel layer for prompt detection and PTY operations.
//!
//! This module handles the interactive shell session, including
//! pattern-based prompt detection and ANSI stripping.

mod buffer;
#[cfg(feature = "ssh")]
mod pty;

pub use buffer::{PatternBuffer, last_line};
#[cfg(feature = "ssh")]
pub use pty::PtyChannel;
