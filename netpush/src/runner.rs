//! Per-host orchestration of the session lifecycle.
//!
//! Hosts are handled strictly one after the other. Every session the runner
//! opens is closed again before the next host is touched, whatever the
//! operation returned.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use log::{info, warn};

use crate::command::{self, CommandResult};
use crate::driver::Driver;
use crate::error::Result;
use crate::install::{self, ConfigApplyResult, ConfigFile};
use crate::platform::requires_commit;
use crate::session::{ConnectionParams, OpContext, Session, SessionFactory};

/// What a multi-host run does when one host fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing host and return its error.
    #[default]
    FailFast,
    /// Record the failure for that host and carry on.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(Self::FailFast),
            "best-effort" => Ok(Self::BestEffort),
            other => Err(format!("unknown failure policy '{other}' (fail-fast, best-effort)")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FailFast => "fail-fast",
            Self::BestEffort => "best-effort",
        })
    }
}

/// Runs operations against hosts through a [`SessionFactory`].
pub struct Runner<F> {
    factory: F,
    policy: FailurePolicy,
}

impl<F: SessionFactory> Runner<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            policy: FailurePolicy::default(),
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run `command` on every host, in order.
    ///
    /// The command is checked once up front; a rejected command opens no
    /// session at all.
    pub async fn run_command(
        &self,
        hosts: &IndexSet<String>,
        params: &ConnectionParams,
        command: &str,
    ) -> Result<IndexMap<String, CommandResult>> {
        command::validate_command(command)?;
        info!("running {command:?} on {} hosts ({})", hosts.len(), self.policy);

        let mut results = IndexMap::with_capacity(hosts.len());
        for host in hosts {
            let outcome = self.command_on(&params.for_host(host), command).await;
            let result = match outcome {
                Ok(output) => CommandResult::ok(host, output),
                Err(e) if e.is_fatal() || self.policy == FailurePolicy::FailFast => return Err(e),
                Err(e) => {
                    warn!("{host}: {e}; continuing");
                    CommandResult::failed(host, e.to_string())
                }
            };
            results.insert(host.clone(), result);
        }
        Ok(results)
    }

    async fn command_on(&self, params: &ConnectionParams, command: &str) -> Result<String> {
        let mut session = self.factory.open(params, OpContext::new(&params.host)).await?;
        let outcome = command::execute(&mut session, command).await;
        release(session).await;
        outcome
    }

    /// Push `config_file` to `params.host`, committing on platforms that need
    /// it, and write a before/after diff when `diff_file` is given.
    ///
    /// The file is read before the host is contacted.
    pub async fn install_config(
        &self,
        params: &ConnectionParams,
        config_file: &Path,
        diff_file: Option<&Path>,
    ) -> Result<ConfigApplyResult> {
        let config = ConfigFile::read(config_file).await?;
        let commit_required = requires_commit(&params.device_type);

        let mut session = self.factory.open(params, OpContext::new(&params.host)).await?;
        let outcome =
            install::install_with_diff(&mut session, &config, commit_required, diff_file).await;
        release(session).await;
        outcome
    }
}

/// Close a session; a failed close is logged and otherwise ignored.
async fn release<D: Driver>(session: Session<D>) {
    let ctx = session.context().clone();
    if let Err(e) = session.close().await {
        warn!("{ctx} close failed: {e}");
    }
}
