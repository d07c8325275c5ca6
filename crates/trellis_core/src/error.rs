//! Host errors.

use thiserror::Error;
use trellis_registry::{ContributorId, RegistryError};

/// Error raised by the contributor host and its configuration.
#[derive(Debug, Error)]
pub enum HostError {
    /// A contributor with this id was already added.
    #[error("contributor '{id}' is already added")]
    DuplicateContributor {
        /// The contributor id.
        id: ContributorId,
    },

    /// No contributor with this id was added.
    #[error("contributor '{id}' is not known to the host")]
    UnknownContributor {
        /// The contributor id.
        id: ContributorId,
    },

    /// A contributor's startup failed to register its contributions.
    #[error("contributor '{id}' failed to start: {source}")]
    Startup {
        /// The contributor id.
        id: ContributorId,
        /// The registry rejection.
        #[source]
        source: RegistryError,
    },

    /// The host configuration could not be parsed.
    #[error("invalid host configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configured log level is not a tracing level.
    #[error("invalid log level '{level}'")]
    InvalidLevel {
        /// The rejected level string.
        level: String,
    },
}
