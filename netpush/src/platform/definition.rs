//! Platform definition for vendor-specific configurations.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::VendorBehavior;
use super::privilege_level::PrivilegeLevel;

/// Platform definition containing all vendor-specific configuration.
#[derive(Clone)]
pub struct PlatformDefinition {
    /// Platform name, the device type tag (e.g., "cisco_ios", "vyos").
    pub name: String,

    /// Privilege levels for this platform.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Privilege level commands are sent from.
    pub default_privilege: String,

    /// Privilege level configuration lines are sent from.
    pub config_privilege: String,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when connection is established.
    pub on_open_commands: Vec<String>,

    /// Command that prints the running configuration.
    pub running_config_command: String,

    /// Command that commits staged configuration.
    pub commit_command: String,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Optional vendor-specific behavior.
    pub behavior: Option<Arc<dyn VendorBehavior>>,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            config_privilege: "configuration".to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            running_config_command: "show running-config".to_string(),
            commit_command: "commit".to_string(),
            terminal_width: 511,
            terminal_height: 24,
            behavior: None,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set the running-config command.
    pub fn with_running_config_command(mut self, command: impl Into<String>) -> Self {
        self.running_config_command = command.into();
        self
    }

    /// Set the commit command.
    pub fn with_commit_command(mut self, command: impl Into<String>) -> Self {
        self.commit_command = command.into();
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set vendor behavior.
    pub fn with_behavior(mut self, behavior: Arc<dyn VendorBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// First failure pattern contained in `output`, if any.
    pub fn failure_in(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("privilege_levels", &self.privilege_levels)
            .field("default_privilege", &self.default_privilege)
            .field("config_privilege", &self.config_privilege)
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .field("running_config_command", &self.running_config_command)
            .field("commit_command", &self.commit_command)
            .field(
                "behavior",
                &self.behavior.as_ref().map(|_| "<VendorBehavior>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_in() {
        let platform = PlatformDefinition::new("test")
            .with_failure_pattern("% Invalid input")
            .with_failure_pattern("% Incomplete command");

        assert_eq!(
            platform.failure_in("show ip rout\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(platform.failure_in("Gi0/0 up"), None);
    }

    #[test]
    fn test_defaults() {
        let platform = PlatformDefinition::new("test");
        assert_eq!(platform.config_privilege, "configuration");
        assert_eq!(platform.running_config_command, "show running-config");
        assert_eq!(platform.commit_command, "commit");
    }
}
