//! Configuration install with optional commit and before/after diff.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::command;
use crate::diff::{diff, write_diff};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::session::Session;

/// Commit response meaning the candidate config matched the running one.
pub const NO_CHANGES_MARKER: &str = "No configuration changes to commit";

/// Outcome of pushing one config file to one host.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigApplyResult {
    pub host: String,
    /// Absolute path of the file that was pushed.
    pub file: PathBuf,
    pub changed: bool,
    /// Device transcript of the pushed lines.
    pub raw_output: String,
    /// Commit response, when a commit was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_outcome: Option<String>,
    /// Config lines the device answered with an error.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_lines: Vec<String>,
    /// Where the before/after diff was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_file: Option<PathBuf>,
    pub message: String,
}

impl ConfigApplyResult {
    pub fn output_lines(&self) -> Vec<&str> {
        self.raw_output.lines().collect()
    }
}

/// Whether a commit response means something changed.
pub fn commit_changed(outcome: &str) -> bool {
    !outcome.trim().is_empty() && !outcome.contains(NO_CHANGES_MARKER)
}

/// A config file read from disk: its absolute path and non-blank lines.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl ConfigFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;

        let lines = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { path, lines })
    }
}

/// Push `config_file` line by line in configuration mode, then commit when
/// `commit_required`.
///
/// Configuration mode is always left afterwards; a failure to leave it is
/// logged and does not replace the outcome. Lines already applied are not
/// rolled back when a later step fails.
pub async fn apply<D: Driver>(
    session: &mut Session<D>,
    config_file: &Path,
    commit_required: bool,
) -> Result<ConfigApplyResult> {
    let config = ConfigFile::read(config_file).await?;
    apply_config(session, &config, commit_required).await
}

/// [`apply`] for a config file that was already read.
pub async fn apply_config<D: Driver>(
    session: &mut Session<D>,
    config: &ConfigFile,
    commit_required: bool,
) -> Result<ConfigApplyResult> {
    let ctx = session.context().clone();
    info!("{ctx} pushing {} lines from {}", config.lines.len(), config.path.display());

    let outcome = push(session, &config.lines, commit_required).await;

    match session.driver_mut().exit_config_mode().await {
        Ok(()) => info!("{ctx} left configuration mode"),
        Err(e) => warn!("{ctx} failed to leave configuration mode: {e}"),
    }

    let pushed = outcome?;
    let changed = pushed.commit_outcome.as_deref().is_some_and(commit_changed);

    let message = match (&pushed.commit_outcome, changed) {
        (None, _) => format!(
            "Configuration sent to {}; {} has no commit step",
            ctx.host,
            session.device_type()
        ),
        (Some(_), true) => format!("Changes were committed to {}", ctx.host),
        (Some(_), false) => {
            format!("A diff was not detected on {}. No changes to commit", ctx.host)
        }
    };
    info!("{ctx} {message}");

    Ok(ConfigApplyResult {
        host: ctx.host,
        file: config.path.clone(),
        changed,
        raw_output: pushed.raw_output,
        commit_outcome: pushed.commit_outcome,
        rejected_lines: pushed.rejected_lines,
        diff_file: None,
        message,
    })
}

struct Pushed {
    raw_output: String,
    commit_outcome: Option<String>,
    rejected_lines: Vec<String>,
}

async fn push<D: Driver>(
    session: &mut Session<D>,
    lines: &[String],
    commit_required: bool,
) -> Result<Pushed> {
    let ctx = session.context().clone();
    let apply_error = |e: Error| Error::Apply {
        host: ctx.host.clone(),
        reason: e.to_string(),
    };

    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let responses = session
        .driver_mut()
        .send_config(&lines, false)
        .await
        .map_err(apply_error)?;

    let mut rejected_lines = vec![];
    for response in responses.iter().filter(|r| !r.is_success()) {
        warn!(
            "{ctx} device rejected {:?}: {}",
            response.command,
            response.failure_message.as_deref().unwrap_or_default()
        );
        rejected_lines.push(response.command.clone());
    }
    let raw_output = responses
        .iter()
        .map(|r| r.raw_result.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let commit_outcome = if commit_required {
        info!("{ctx} committing");
        let response = session.driver_mut().commit().await.map_err(apply_error)?;
        if let Some(failure) = &response.failure_message {
            return Err(Error::Apply {
                host: ctx.host.clone(),
                reason: format!("commit rejected: {failure}"),
            });
        }
        Some(response.result)
    } else {
        None
    };

    Ok(Pushed {
        raw_output,
        commit_outcome,
        rejected_lines,
    })
}

/// [`apply_config`], bracketed by running-config snapshots diffed into
/// `diff_file`.
pub async fn install_with_diff<D: Driver>(
    session: &mut Session<D>,
    config: &ConfigFile,
    commit_required: bool,
    diff_file: Option<&Path>,
) -> Result<ConfigApplyResult> {
    let Some(diff_file) = diff_file else {
        return apply_config(session, config, commit_required).await;
    };

    let snapshot_command = session.driver().platform().running_config_command.clone();
    let before = command::execute(session, &snapshot_command).await?;
    let mut result = apply_config(session, config, commit_required).await?;
    let after = command::execute(session, &snapshot_command).await?;

    write_diff(diff(&before, &after), diff_file).await?;
    info!("{} diff written to {}", session.context(), diff_file.display());
    result.diff_file = Some(diff_file.to_path_buf());
    Ok(result)
}
