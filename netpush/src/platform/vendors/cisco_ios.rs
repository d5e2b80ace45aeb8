//! Cisco IOS / IOS-XE platform definition.
//!
//! This is the default device type. Most "IOS-like" boxes (Brocade,
//! Dell OS6, older HP) are close enough to drive with it.
//!
//! # Prompt Examples
//!
//! ```text
//! router>                     # exec
//! router#                     # privilege_exec
//! router(config)#             # configuration
//! router(config-if)#          # configuration sub-mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Platform name for Cisco IOS.
pub const PLATFORM_NAME: &str = "cisco_ios";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .below("exec", "enable", "disable")
        .with_enter_password(r"(?mi)^password:\s?$")
        .unwrap()
        .excluding("(config");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(config[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap()
    .below("privilege_exec", "configure terminal", "end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_running_config_command("show running-config")
        .with_terminal_size(511, 24)
}
