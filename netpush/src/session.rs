//! Session handles and the factory that opens them.
//!
//! A [`Session`] is one live CLI connection to one device. It is owned by
//! the operation that opened it and released with [`Session::close`]; a
//! session dropped without `close` logs a warning and drops its transport,
//! which tears the connection down.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{info, warn};
use secrecy::SecretString;

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::platform::DEFAULT_DEVICE_TYPE;
use crate::transport::{AuthMethod, HostKeyVerification};

/// Everything needed to open a session to one device.
///
/// `Debug` and [`summary`](Self::summary) never print secrets.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub device_type: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    pub verbose: bool,
    pub timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    /// known_hosts file to check against instead of `~/.ssh/known_hosts`.
    pub known_hosts: Option<PathBuf>,
}

impl ConnectionParams {
    /// Parameters for `username@host` on the default device type, no auth.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            host: host.into(),
            port: 22,
            username: username.into(),
            auth: AuthMethod::None,
            verbose: false,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts: None,
        }
    }

    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: path.into(),
            passphrase: None,
        };
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }

    /// Same parameters aimed at another host.
    pub fn for_host(&self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self.clone()
        }
    }

    /// Redacted one-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "host={} port={} device_type={} username={} auth={}",
            self.host,
            self.port,
            self.device_type,
            self.username,
            self.auth.kind()
        )
    }
}

static NEXT_OP_ID: AtomicU64 = AtomicU64::new(1);

/// Host and operation id prefixed to every log line about one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpContext {
    pub host: String,
    pub op_id: u64,
}

impl OpContext {
    /// New context with a process-unique operation id.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            op_id: NEXT_OP_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl fmt::Display for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}#{}]", self.host, self.op_id)
    }
}

/// An open CLI session to one device.
pub struct Session<D: Driver> {
    driver: D,
    ctx: OpContext,
    closed: bool,
}

impl<D: Driver> Session<D> {
    /// Wrap an already opened driver.
    pub fn new(driver: D, ctx: OpContext) -> Self {
        Self {
            driver,
            ctx,
            closed: false,
        }
    }

    pub fn host(&self) -> &str {
        &self.ctx.host
    }

    pub fn context(&self) -> &OpContext {
        &self.ctx
    }

    /// Device type tag of the platform behind this session.
    pub fn device_type(&self) -> &str {
        &self.driver.platform().name
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Close the connection and release the session.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        info!("{} closing session", self.ctx);
        self.driver.close().await
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("{} session dropped without close()", self.ctx);
        }
    }
}

/// Opens sessions. One call, one host, one connection, no retries.
pub trait SessionFactory: Send + Sync {
    type Driver: Driver;

    /// Open a session, failing with [`Error::Connection`].
    fn open(
        &self,
        params: &ConnectionParams,
        ctx: OpContext,
    ) -> impl Future<Output = Result<Session<Self::Driver>>> + Send;
}

/// Fails with [`Error::Dependency`] when no SSH transport was compiled in.
pub fn check_dependencies() -> Result<()> {
    if cfg!(feature = "ssh") {
        Ok(())
    } else {
        Err(Error::Dependency {
            feature: "ssh".to_string(),
        })
    }
}

#[cfg(feature = "ssh")]
pub use self::ssh::SshSessionFactory;

#[cfg(feature = "ssh")]
mod ssh {
    use log::info;

    use super::{ConnectionParams, OpContext, Session, SessionFactory};
    use crate::driver::{Driver, DriverBuilder, GenericDriver};
    use crate::error::{Error, Result};

    /// Opens sessions over SSH with [`GenericDriver`].
    #[derive(Debug, Default, Clone)]
    pub struct SshSessionFactory;

    impl SshSessionFactory {
        async fn connect(params: &ConnectionParams) -> Result<GenericDriver> {
            let mut builder = DriverBuilder::new(params.host.clone())
                .port(params.port)
                .username(params.username.clone())
                .auth(params.auth.clone())
                .platform(params.device_type.clone())
                .timeout(params.timeout)
                .host_key_verification(params.host_key_verification.clone())
                .verbose(params.verbose);
            if let Some(path) = &params.known_hosts {
                builder = builder.known_hosts_path(path.clone());
            }
            let mut driver = builder.build()?;
            driver.open().await?;
            Ok(driver)
        }
    }

    impl SessionFactory for SshSessionFactory {
        type Driver = GenericDriver;

        async fn open(
            &self,
            params: &ConnectionParams,
            ctx: OpContext,
        ) -> Result<Session<GenericDriver>> {
            info!("{ctx} connecting: {}", params.summary());

            let driver = Self::connect(params).await.map_err(|source| Error::Connection {
                host: params.host.clone(),
                source: Box::new(source),
            })?;

            info!("{ctx} connected, privilege {:?}", driver.current_privilege());
            Ok(Session::new(driver, ctx))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::driver::mock::MockDriver;

    /// Hands out scripted mock drivers; the journal records opens and closes.
    pub(crate) struct MockFactory {
        script: Box<dyn Fn(&str) -> MockDriver + Send + Sync>,
        pub journal: Arc<Mutex<Vec<String>>>,
        pub unreachable: Vec<String>,
    }

    impl MockFactory {
        pub fn new(script: impl Fn(&str) -> MockDriver + Send + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                journal: Arc::new(Mutex::new(vec![])),
                unreachable: vec![],
            }
        }

        pub fn unreachable(mut self, host: &str) -> Self {
            self.unreachable.push(host.to_string());
            self
        }
    }

    impl SessionFactory for MockFactory {
        type Driver = MockDriver;

        async fn open(
            &self,
            params: &ConnectionParams,
            ctx: OpContext,
        ) -> Result<Session<MockDriver>> {
            self.journal.lock().unwrap().push(format!("open {}", params.host));
            let mut driver = (self.script)(&params.host);
            driver.journal = self.journal.clone();
            if self.unreachable.contains(&params.host) {
                driver.fail_open = true;
            }
            driver.open().await.map_err(|source| Error::Connection {
                host: params.host.clone(),
                source: Box::new(source),
            })?;
            Ok(Session::new(driver, ctx))
        }
    }

    #[test]
    fn test_summary_redacts_password() {
        let params = ConnectionParams::new("10.0.0.1", "admin")
            .password("hunter2")
            .device_type("vyos");
        let summary = params.summary();
        assert!(summary.contains("host=10.0.0.1"));
        assert!(summary.contains("device_type=vyos"));
        assert!(summary.contains("username=admin"));
        assert!(!summary.contains("hunter2"));
        assert!(!format!("{params:?}").contains("hunter2"));
    }

    #[test]
    fn test_for_host_keeps_everything_else() {
        let params = ConnectionParams::new("r1", "admin")
            .port(2222)
            .device_type("juniper_junos")
            .known_hosts("/etc/netpush/known_hosts");
        let other = params.for_host("r2");
        assert_eq!(other.host, "r2");
        assert_eq!(other.port, 2222);
        assert_eq!(other.device_type, "juniper_junos");
        assert_eq!(other.known_hosts, Some(PathBuf::from("/etc/netpush/known_hosts")));
    }

    #[test]
    fn test_op_ids_are_unique() {
        let a = OpContext::new("r1");
        let b = OpContext::new("r1");
        assert_ne!(a.op_id, b.op_id);
        assert!(a.to_string().starts_with("[r1#"));
    }

    #[test]
    fn test_check_dependencies() {
        assert_eq!(check_dependencies().is_ok(), cfg!(feature = "ssh"));
    }

    #[tokio::test]
    async fn test_open_failure_is_connection_error() {
        let factory = MockFactory::new(|_| MockDriver::new("cisco_ios")).unreachable("r9");
        let params = ConnectionParams::new("r9", "admin");
        match factory.open(&params, OpContext::new("r9")).await {
            Err(Error::Connection { host, .. }) => assert_eq!(host, "r9"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected connection failure"),
        }
    }

    #[test]
    fn test_close_releases_driver() {
        tokio_test::block_on(async {
            let factory = MockFactory::new(|_| MockDriver::new("cisco_ios"));
            let params = ConnectionParams::new("r1", "admin");
            let session = factory.open(&params, OpContext::new("r1")).await.unwrap();
            assert!(session.driver().is_open());
            assert_eq!(session.device_type(), "cisco_ios");
            session.close().await.unwrap();
            assert_eq!(*factory.journal.lock().unwrap(), vec!["open r1", "close"]);
        });
    }
}
