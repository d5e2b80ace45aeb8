//! VyOS platform definition.
//!
//! VyOS stages `set`/`delete` lines in a candidate configuration; nothing
//! changes on the box until `commit`. A commit with an empty candidate
//! answers "No configuration changes to commit".
//!
//! # Prompt Examples
//!
//! ```text
//! vyos@vyos:~$              # operational mode
//! [edit]
//! vyos@vyos#                # configuration mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Platform name for VyOS.
pub const PLATFORM_NAME: &str = "vyos";

/// Create the VyOS platform definition.
pub fn platform() -> PlatformDefinition {
    let operational =
        PrivilegeLevel::new("operational", r"(?m)^[\w.\-@]{1,63}:[\w~/.\-]*\$\s?$").unwrap();

    let configuration = PrivilegeLevel::new("configuration", r"(?m)^[\w.\-@]{1,63}#\s?$")
        .unwrap()
        .below("operational", "configure", "exit discard");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(operational)
        .with_privilege(configuration)
        .with_default_privilege("operational")
        .with_failure_pattern("Invalid command")
        .with_failure_pattern("Set failed")
        .with_failure_pattern("Commit failed")
        .with_failure_pattern("is not valid")
        .with_on_open_command("set terminal length 0")
        .with_on_open_command("set terminal width 512")
        .with_running_config_command("show configuration commands")
        .with_commit_command("commit")
        .with_terminal_size(511, 24)
}
