mod connection;
mod global;
mod hosts;

pub use connection::ConnectionArgs;
pub use global::GlobalArgs;
pub use hosts::HostArgs;
