//! Contributor identity and key namespacing.
//!
//! Every key a contributor registers is rewritten to
//! `{contributor}-{raw_key}` and sanitized so the result is usable as an
//! identifier: only ASCII letters, digits, `-` and `_` survive, anything else
//! is replaced. Two contributors can therefore both register `"color"` and
//! end up with `"p1-color"` and `"p2-color"`.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Replacement used for characters that are not identifier-safe.
pub const DEFAULT_REPLACEMENT: char = '-';

// ─────────────────────────────────────────────────────────────────────────────
// ContributorId
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier of a contributing plugin.
///
/// Not validated against any plugin catalog; the host's lifecycle system is
/// trusted to hand out consistent identifiers. Internally uses `Arc<str>` so
/// cloning is a reference count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(Arc<str>);

impl ContributorId {
    /// Creates a contributor id.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ContributorId {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContributorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContributorId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for ContributorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Namespacing
// ─────────────────────────────────────────────────────────────────────────────

/// Returns true if `c` may appear in a namespaced key.
#[must_use]
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Replaces every character that is not identifier-safe with `replacement`.
///
/// A `replacement` that is itself unsafe falls back to [`DEFAULT_REPLACEMENT`].
#[must_use]
pub fn sanitize_identifier(raw: &str, replacement: char) -> String {
    let replacement = if is_identifier_char(replacement) {
        replacement
    } else {
        DEFAULT_REPLACEMENT
    };
    raw.chars()
        .map(|c| if is_identifier_char(c) { c } else { replacement })
        .collect()
}

/// Derives the collision-safe key for `raw_key` owned by `contributor`.
///
/// When either part is empty the raw key is returned untouched; such entries
/// are rejected later by validation for missing required fields.
#[must_use]
pub fn namespaced_key(contributor: &ContributorId, raw_key: &str, replacement: char) -> String {
    if contributor.is_empty() || raw_key.is_empty() {
        return raw_key.to_string();
    }
    sanitize_identifier(&format!("{contributor}-{raw_key}"), replacement)
}
