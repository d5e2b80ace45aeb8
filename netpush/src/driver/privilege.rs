//! Privilege level tracking and navigation.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and finds routes between levels.
///
/// Levels are nodes; every parent link is an edge walkable in both
/// directions (escalate down the tree, de-escalate up it).
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,
    neighbors: HashMap<String, Vec<String>>,
    current: Option<String>,
}

impl PrivilegeManager {
    /// Create a manager for the given levels, starting at the root level.
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        let mut neighbors: HashMap<String, Vec<String>> = HashMap::new();
        for (name, level) in &levels {
            neighbors.entry(name.clone()).or_default();
            if let Some(parent) = level.parent() {
                neighbors.entry(name.clone()).or_default().push(parent.to_string());
                neighbors.entry(parent.to_string()).or_default().push(name.clone());
            }
        }

        let current = levels
            .values()
            .find(|l| l.link.is_none())
            .map(|l| l.name.clone());

        Self {
            levels,
            neighbors,
            current,
        }
    }

    /// Determine the privilege level a prompt belongs to.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Update the current level from a prompt; unknown prompts leave it as is.
    pub fn update_from_prompt(&mut self, prompt: &str) -> Option<&str> {
        let name = self.determine_from_prompt(prompt).ok()?.name.clone();
        self.current = Some(name);
        self.current.as_deref()
    }

    /// Get the current privilege level.
    pub fn current(&self) -> Option<&PrivilegeLevel> {
        self.current.as_ref().and_then(|name| self.levels.get(name))
    }

    /// Shortest route from `from` to `to`, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        came_from.insert(from, from);

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path = vec![to.to_string()];
                let mut cursor = to;
                while cursor != from {
                    cursor = came_from[cursor];
                    path.push(cursor.to_string());
                }
                path.reverse();
                return Ok(path);
            }

            for next in self.neighbors.get(node).into_iter().flatten() {
                let next = next.as_str();
                if !came_from.contains_key(next) {
                    came_from.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        Err(DriverError::NoPrivilegePath {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into())
    }

    /// Command (and optional password prompt) moving between adjacent levels.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<TransitionInfo> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        match (&to_level.link, &from_level.link) {
            (Some(down), _) if down.parent == from => Some(TransitionInfo {
                command: down.enter.clone(),
                auth_prompt: to_level.enter_password.clone(),
            }),
            (_, Some(up)) if up.parent == to => Some(TransitionInfo {
                command: up.leave.clone(),
                auth_prompt: None,
            }),
            _ => None,
        }
    }
}

/// Information about a privilege level transition.
#[derive(Debug, Clone)]
pub struct TransitionInfo {
    /// Command to execute for the transition.
    pub command: String,

    /// Password prompt to answer, if the transition asks for one.
    pub auth_prompt: Option<Regex>,
}
