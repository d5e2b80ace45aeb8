//! CLI modes and the commands that move between them.

use regex::bytes::Regex;

/// One CLI mode of a device (exec, privileged exec, configuration, ...).
///
/// Modes form a tree: every mode but the root hangs off a parent through a
/// [`ModeLink`]. The driver walks the tree to reach the mode an operation
/// needs, e.g. configuration mode for a config push.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    pub name: String,
    /// Matches the prompt shown while in this mode.
    pub prompt: Regex,
    /// How this mode is reached from its parent; `None` for the root.
    pub link: Option<ModeLink>,
    /// Password prompt the device may show after the enter command.
    pub enter_password: Option<Regex>,
    /// Prompt substrings that rule this mode out even when `prompt` matches.
    pub excluded: Vec<String>,
}

/// Edge between a mode and its parent.
#[derive(Debug, Clone)]
pub struct ModeLink {
    pub parent: String,
    /// Sent in the parent to enter the child.
    pub enter: String,
    /// Sent in the child to return to the parent.
    pub leave: String,
}

impl PrivilegeLevel {
    /// A mode named `name` whose prompt matches `prompt`.
    pub fn new(name: impl Into<String>, prompt: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt: Regex::new(prompt)?,
            link: None,
            enter_password: None,
            excluded: vec![],
        })
    }

    /// Hang this mode below `parent`, entered with `enter` and left with `leave`.
    pub fn below(
        mut self,
        parent: impl Into<String>,
        enter: impl Into<String>,
        leave: impl Into<String>,
    ) -> Self {
        self.link = Some(ModeLink {
            parent: parent.into(),
            enter: enter.into(),
            leave: leave.into(),
        });
        self
    }

    /// Expect a password prompt matching `pattern` when entering this mode.
    pub fn with_enter_password(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.enter_password = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Refuse prompts containing `text`.
    pub fn excluding(mut self, text: impl Into<String>) -> Self {
        self.excluded.push(text.into());
        self
    }

    pub fn parent(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.parent.as_str())
    }

    /// Whether `prompt` belongs to this mode.
    pub fn matches(&self, prompt: &str) -> bool {
        !self.excluded.iter().any(|text| prompt.contains(text.as_str()))
            && self.prompt.is_match(prompt.as_bytes())
    }
}
