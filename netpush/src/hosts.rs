//! Host lists read from delimited text files.

use std::path::PathBuf;

use indexmap::IndexSet;
use log::{info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};

/// A delimited file with one host per line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostFile {
    pub filename: String,
    /// Directory the file lives in; the working directory when unset.
    #[serde(default)]
    pub root_path: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Zero-based field holding the host.
    #[serde(default)]
    pub key: usize,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl HostFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            root_path: None,
            delimiter: default_delimiter(),
            key: 0,
        }
    }

    pub fn root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn key(mut self, key: usize) -> Self {
        self.key = key;
        self
    }

    /// Full path of the host file.
    pub fn path(&self) -> PathBuf {
        self.root_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.filename)
    }

    /// Read the file and collect field `key` of every line, first seen first.
    pub fn resolve(&self) -> Result<IndexSet<String>> {
        let path = self.path();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;

        let mut hosts = IndexSet::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split(self.delimiter.as_str()).nth(self.key) {
                Some(host) => {
                    hosts.insert(host.trim().to_string());
                }
                None => warn!(
                    "{}:{}: no field {} in {:?}, skipping",
                    path.display(),
                    number + 1,
                    self.key,
                    line
                ),
            }
        }

        info!("loaded {} hosts from {}", hosts.len(), path.display());
        Ok(hosts)
    }
}
