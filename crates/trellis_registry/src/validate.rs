//! Batch validation.
//!
//! [`OptionValidator`] runs every check against a whole batch before anything
//! is committed, in this order, stopping at the first failure:
//!
//! 1. no duplicate raw keys inside the batch
//! 2. schema: presence, type, custom predicates
//! 3. schema: conditional companion fields
//! 4. no collision with reserved keys, already-registered keys or another
//!    namespaced key of the same batch
//!
//! Deprecation notices do not fail validation; they are logged.

use hashbrown::HashSet;

use crate::config::RegistryConfig;
use crate::namespace::namespaced_key;
use crate::option::Contribution;

/// Validates registration batches for one registry.
#[derive(Debug, Clone, Copy)]
pub struct OptionValidator<'a> {
    config: &'a RegistryConfig,
}

impl<'a> OptionValidator<'a> {
    /// Creates a validator for `config`.
    #[must_use]
    pub fn new(config: &'a RegistryConfig) -> Self {
        Self { config }
    }

    /// Validates `batch` and returns the namespaced key of every entry.
    ///
    /// `is_registered` reports whether a namespaced key is already taken.
    ///
    /// # Errors
    ///
    /// Returns the first failure as a human-readable reason.
    pub fn validate<C, F>(&self, batch: &[C], is_registered: F) -> Result<Vec<String>, String>
    where
        C: Contribution,
        F: Fn(&str) -> bool,
    {
        let main_key = self.config.main_key();

        let mut seen = HashSet::with_capacity(batch.len());
        for option in batch {
            if !seen.insert(option.key()) {
                return Err(format!(
                    "options have duplicate {main_key} '{}'",
                    option.key()
                ));
            }
        }

        for option in batch {
            let report = self.config.schema().check(option)?;
            for notice in report.deprecations {
                tracing::warn!(
                    api = self.config.api_name(),
                    key = option.key(),
                    "{notice}"
                );
            }
        }

        let mut keys: Vec<String> = Vec::with_capacity(batch.len());
        let mut assigned = HashSet::with_capacity(batch.len());
        for option in batch {
            let key = namespaced_key(
                option.contributor_id(),
                option.key(),
                self.config.replacement(),
            );
            if self.config.is_reserved(option.key()) || self.config.is_reserved(&key) {
                return Err(format!(
                    "{main_key} '{}' conflicts with a built-in {main_key}",
                    option.key()
                ));
            }
            if is_registered(&key) {
                return Err(format!("{main_key} '{key}' already exists"));
            }
            if !assigned.insert(key.clone()) {
                return Err(format!(
                    "{main_key} '{}' maps to '{key}', which another option in the batch also maps to",
                    option.key()
                ));
            }
            keys.push(key);
        }

        Ok(keys)
    }
}
