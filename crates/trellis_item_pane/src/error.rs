//! Section lifecycle errors.

use thiserror::Error;

/// Error returned when a [`SectionController`](crate::SectionController)
/// method is called in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    /// The section has not been initialized yet.
    #[error("section '{pane_id}' is not initialized")]
    NotInitialized {
        /// Namespaced pane id.
        pane_id: String,
    },

    /// `init` was called a second time.
    #[error("section '{pane_id}' is already initialized")]
    AlreadyInitialized {
        /// Namespaced pane id.
        pane_id: String,
    },

    /// The section has been destroyed.
    #[error("section '{pane_id}' has been destroyed")]
    Destroyed {
        /// Namespaced pane id.
        pane_id: String,
    },
}
