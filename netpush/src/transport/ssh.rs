//! SSH connection and PTY shell setup over russh.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, known_hosts, load_secret_key};
use secrecy::ExposeSecret;
use tokio::net::TcpStream;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::channel::PtyChannel;
use crate::error::{Result, TransportError};

/// An authenticated SSH connection to one device.
pub struct SshTransport {
    handle: Handle<HostKeyCheck>,
    config: SshConfig,
}

/// Await `fut`, failing with [`TransportError::Timeout`] after `limit`.
async fn within<T>(
    limit: Duration,
    fut: impl Future<Output = T>,
) -> std::result::Result<T, TransportError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TransportError::Timeout(limit))
}

impl SshTransport {
    /// Dial, handshake and authenticate; each network phase gets the full
    /// configured timeout.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let rejection = Arc::new(Mutex::new(None));
        let checker = HostKeyCheck {
            policy: config.host_key_verification.clone(),
            known_hosts: KnownHosts {
                host: config.host.clone(),
                port: config.port,
                file: config.known_hosts_path.clone(),
            },
            rejection: Arc::clone(&rejection),
        };

        let stream = within(config.timeout, TcpStream::connect((config.host.as_str(), config.port)))
            .await?
            .map_err(|source| TransportError::ConnectionFailed {
                host: config.host.clone(),
                port: config.port,
                source,
            })?;
        debug!("tcp connected to {}", config.socket_addr());

        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });
        let handshake = client::connect_stream(client_config, stream, checker);
        let mut handle = within(config.timeout, handshake).await?.map_err(|e| {
            // russh only reports UnknownKey; the checker kept the real reason
            let reason = rejection.lock().ok().and_then(|mut slot| slot.take());
            reason.unwrap_or(TransportError::Ssh(e))
        })?;

        debug!("authenticating {}@{} with {}", config.username, config.host, config.auth.kind());
        let login = authenticate(&mut handle, &config.username, &config.auth);
        if !within(config.timeout, login).await?? {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(Self { handle, config })
    }

    /// Open an interactive shell on a PTY sized for the platform.
    pub async fn open_channel(&self, search_depth: usize) -> Result<PtyChannel> {
        let channel = self.handle.channel_open_session().await.map_err(TransportError::Ssh)?;
        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;
        channel.request_shell(true).await.map_err(TransportError::Ssh)?;

        Ok(PtyChannel::new(channel, search_depth))
    }

    /// Disconnect politely.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Whether the server accepted `auth` for `user`.
async fn authenticate(
    handle: &mut Handle<HostKeyCheck>,
    user: &str,
    auth: &AuthMethod,
) -> Result<bool> {
    let result = match auth {
        AuthMethod::None => handle.authenticate_none(user).await,
        AuthMethod::Password(password) => {
            handle
                .authenticate_password(user, password.expose_secret())
                .await
        }
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                .map_err(|e| TransportError::Key(format!("{}: {e}", path.display())))?;
            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();
            handle
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                .await
        }
    };
    Ok(result.map_err(TransportError::Ssh)?.success())
}

/// A host's entry in a known_hosts file; `file` falls back to
/// `~/.ssh/known_hosts`.
struct KnownHosts {
    host: String,
    port: u16,
    file: Option<PathBuf>,
}

impl KnownHosts {
    /// `Ok(false)` when the host has no entry yet.
    fn contains(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let found = match &self.file {
            Some(path) => known_hosts::check_known_hosts_path(&self.host, self.port, key, path),
            None => known_hosts::check_known_hosts(&self.host, self.port, key),
        };
        found.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let learned = match &self.file {
            Some(path) => known_hosts::learn_known_hosts_path(&self.host, self.port, key, path),
            None => known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        learned.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }
}

/// russh client handler applying the host key policy.
struct HostKeyCheck {
    policy: HostKeyVerification,
    known_hosts: KnownHosts,
    /// Why the key was refused, picked up by [`SshTransport::connect`].
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl HostKeyCheck {
    fn refuse(&self, reason: TransportError) -> bool {
        if let Ok(mut slot) = self.rejection.lock() {
            *slot = Some(reason);
        }
        false
    }
}

impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if self.policy == HostKeyVerification::Disabled {
            return Ok(true);
        }

        let accepted = match self.known_hosts.contains(key) {
            Ok(true) => true,
            Ok(false) if self.policy == HostKeyVerification::AcceptNew => {
                if let Err(e) = self.known_hosts.remember(key) {
                    warn!("{}: could not save host key: {e}", self.known_hosts.host);
                }
                true
            }
            Ok(false) => self.refuse(TransportError::HostKeyUnknown {
                host: self.known_hosts.host.clone(),
                port: self.known_hosts.port,
            }),
            Err(e) => self.refuse(e),
        };
        Ok(accepted)
    }
}
