//! Error types for contribution registries.
//!
//! Registry operations never panic on contributor input. Every rejection is
//! reported as a [`RegistryError`] value so contributor code can branch on it
//! without unwinding. Failures raised *by* contributor callbacks are carried as
//! [`HookError`] and contained at the call site.

use thiserror::Error;

/// Errors returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registration batch was malformed or conflicted with existing keys.
    ///
    /// Nothing from the batch was committed.
    #[error("{api}: invalid registration: {reason}")]
    Validation {
        /// Name of the registry that rejected the batch.
        api: String,
        /// Human-readable reason.
        reason: String,
    },

    /// An unregister call referenced a key that is not registered.
    ///
    /// Nothing from the call was removed.
    #[error("{api}: '{key}' is not registered")]
    NotFound {
        /// Name of the registry.
        api: String,
        /// The missing key.
        key: String,
    },

    /// The registration batch was empty.
    #[error("{api}: nothing to register")]
    EmptyBatch {
        /// Name of the registry.
        api: String,
    },
}

impl RegistryError {
    /// Creates a [`Validation`](Self::Validation) error.
    pub fn validation(api: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            api: api.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`NotFound`](Self::NotFound) error.
    pub fn not_found(api: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            api: api.into(),
            key: key.into(),
        }
    }

    /// Returns true if this is a validation rejection.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true if this is a not-found rejection.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error raised by a contributor-supplied callback or a live view refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Creates a hook error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result type returned by contributor hooks.
pub type HookResult = Result<(), HookError>;
