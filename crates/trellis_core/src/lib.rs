//! Host infrastructure for Trellis.
//!
//! - [`config`]: [`HostConfig`], loaded from JSON
//! - [`tracing_setup`]: [`TracingSetup`], the process-wide subscriber
//! - [`registries`]: [`Registries`], the three managers on one lifecycle
//! - [`host`]: [`Host`] and the [`Contributor`] trait

pub mod config;
pub mod error;
pub mod host;
pub mod registries;
pub mod tracing_setup;

pub use config::{HostConfig, LogConfig, ReservedKeys};
pub use error::HostError;
pub use host::{Contributor, Host};
pub use registries::Registries;
pub use tracing_setup::{TracingFormat, TracingSetup};
