//! High-level driver for device interaction.
//!
//! The driver layer provides the API for sending commands, pushing
//! configuration lines and managing privilege levels on network devices.

#[cfg(feature = "ssh")]
mod builder;
#[cfg(feature = "ssh")]
mod generic;
#[cfg(test)]
pub(crate) mod mock;
mod privilege;
mod response;

#[cfg(feature = "ssh")]
pub use builder::DriverBuilder;
#[cfg(feature = "ssh")]
pub use generic::GenericDriver;
pub use privilege::{PrivilegeManager, TransitionInfo};
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::platform::PlatformDefinition;

/// Trait for device drivers.
///
/// [`GenericDriver`] talks to a real device; anything else implementing this
/// trait can stand in for it behind a [`Session`](crate::session::Session).
pub trait Driver: Send + Sync {
    /// Open the connection to the device.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send configuration lines from configuration mode.
    ///
    /// Acquires the platform's configuration privilege, sends every line and,
    /// when `exit_config_mode` is set, returns to the default privilege.
    ///
    /// ```rust,no_run
    /// use netpush::driver::Driver;
    ///
    /// # async fn example(driver: &mut impl Driver) -> Result<(), netpush::Error> {
    /// let responses = driver.send_config(&[
    ///     "interface GigabitEthernet0/1",
    ///     "description Uplink to Core",
    ///     "no shutdown",
    /// ], true).await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_config(
        &mut self,
        lines: &[&str],
        exit_config_mode: bool,
    ) -> impl Future<Output = Result<Vec<Response>>> + Send;

    /// Commit staged configuration (platforms with a candidate config).
    fn commit(&mut self) -> impl Future<Output = Result<Response>> + Send;

    /// Leave configuration mode, returning to the default privilege.
    fn exit_config_mode(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Acquire a specific privilege level.
    fn acquire_privilege(&mut self, privilege: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Get the current privilege level name.
    fn current_privilege(&self) -> Option<&str>;

    /// Platform this driver speaks.
    fn platform(&self) -> &PlatformDefinition;
}
