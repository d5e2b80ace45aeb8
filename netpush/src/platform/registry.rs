//! Global platform registry for looking up platform definitions.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use super::definition::PlatformDefinition;
use super::vendors;
use crate::error::{PlatformError, Result};

/// Global platform registry.
static REGISTRY: LazyLock<RwLock<PlatformRegistry>> =
    LazyLock::new(|| RwLock::new(PlatformRegistry::with_builtins()));

/// Registry for platform definitions, keyed by device type tag.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: HashMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in platforms.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for platform in vendors::builtin() {
            registry.platforms.insert(platform.name.clone(), platform);
        }
        registry
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<PlatformRegistry> {
        &REGISTRY
    }

    /// Look up a platform in the global registry by device type.
    pub fn lookup(device_type: &str) -> Result<PlatformDefinition> {
        let registry = Self::global()
            .read()
            .map_err(|_| PlatformError::InvalidDefinition {
                message: "Failed to acquire registry lock".to_string(),
            })?;

        registry
            .get(device_type)
            .cloned()
            .ok_or_else(|| {
                PlatformError::UnknownPlatform {
                    name: device_type.to_string(),
                }
                .into()
            })
    }

    /// Register a platform definition.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        if self.platforms.contains_key(&platform.name) {
            return Err(PlatformError::AlreadyRegistered {
                name: platform.name.clone(),
            }
            .into());
        }
        self.platforms.insert(platform.name.clone(), platform);
        Ok(())
    }

    /// Get a platform by name.
    pub fn get(&self, name: &str) -> Option<&PlatformDefinition> {
        self.platforms.get(name)
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// List all registered platform names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.platforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
