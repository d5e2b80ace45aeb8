//! Platform definitions for multi-vendor support.
//!
//! This module defines vendor-specific configurations including
//! prompt patterns, privilege levels, and output handling.

mod definition;
mod privilege_level;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::{ModeLink, PrivilegeLevel};
pub use registry::PlatformRegistry;

/// Device type used when the caller does not name one.
pub const DEFAULT_DEVICE_TYPE: &str = "cisco_ios";

/// Platforms whose configuration only takes effect after an explicit commit.
pub const COMMIT_PLATFORMS: &[&str] = &["vyos"];

/// Whether `device_type` needs a commit after configuration lines are sent.
///
/// Unknown device types never require one.
pub fn requires_commit(device_type: &str) -> bool {
    COMMIT_PLATFORMS.contains(&device_type)
}

/// Trait for vendor-specific output handling.
pub trait VendorBehavior: Send + Sync {
    /// Normalize command output (strip command echo, trailing prompt).
    fn normalize_output(&self, raw: &str, command: &str) -> String;

    /// Detect command failure from output.
    fn detect_failure(&self, output: &str) -> Option<String>;
}

/// Default vendor behavior implementation.
pub struct DefaultBehavior;

impl VendorBehavior for DefaultBehavior {
    fn normalize_output(&self, raw: &str, command: &str) -> String {
        let unix = raw.replace("\r\n", "\n");

        // Strip command echo from the beginning
        let output = unix
            .strip_prefix(command)
            .unwrap_or(&unix)
            .trim_start_matches(['\r', '\n']);

        // Strip trailing prompt (last line); a lone line is the prompt itself
        output
            .rfind('\n')
            .map(|pos| output[..pos].to_string())
            .unwrap_or_default()
    }

    fn detect_failure(&self, _output: &str) -> Option<String> {
        None
    }
}
