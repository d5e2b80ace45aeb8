//! Built-in vendor platforms.

pub mod cisco_ios;
pub mod juniper_junos;
pub mod vyos;

use super::PlatformDefinition;

/// All built-in platform definitions.
pub fn builtin() -> Vec<PlatformDefinition> {
    vec![
        cisco_ios::platform(),
        juniper_junos::platform(),
        vyos::platform(),
    ]
}
