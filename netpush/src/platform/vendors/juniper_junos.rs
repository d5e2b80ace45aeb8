//! Juniper JUNOS platform definition.
//!
//! Configuration is a candidate that only takes effect on `commit`.
//!
//! # Prompt Examples
//!
//! ```text
//! user@router>              # exec mode
//! [edit]                    # context line in configuration mode
//! user@router#              # configuration mode
//! {master:0}                # routing-engine indicator (separate line)
//! ```

use std::sync::Arc;

use crate::platform::{DefaultBehavior, PlatformDefinition, PrivilegeLevel, VendorBehavior};

/// Platform name for Juniper JUNOS.
pub const PLATFORM_NAME: &str = "juniper_junos";

/// Create the Juniper JUNOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new(
        "exec",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\n)?[\w\-@()/:\.]{1,63}>\s?$",
    )
    .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\[edit\]\n)?[\w\-@()/:\.]{1,63}#\s?$",
    )
    .unwrap()
    .below("exec", "configure", "exit configuration-mode");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_failure_pattern("unknown command")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("error:")
        .with_failure_pattern("missing argument")
        .with_failure_pattern("is ambiguous")
        .with_failure_pattern("No valid completions")
        .with_on_open_command("set cli screen-length 0")
        .with_on_open_command("set cli screen-width 511")
        .with_running_config_command("show configuration")
        .with_commit_command("commit")
        .with_terminal_size(511, 24)
        .with_behavior(Arc::new(JuniperBehavior))
}

/// Drops the `[edit ...]` and `{master:0}` context lines JUNOS prints.
pub struct JuniperBehavior;

impl VendorBehavior for JuniperBehavior {
    fn normalize_output(&self, raw: &str, command: &str) -> String {
        DefaultBehavior
            .normalize_output(raw, command)
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !(trimmed.starts_with("[edit") || trimmed.starts_with("{master"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn detect_failure(&self, _output: &str) -> Option<String> {
        None
    }
}
