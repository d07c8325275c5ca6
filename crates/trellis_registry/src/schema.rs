//! Option schemas.
//!
//! An [`OptionSchema`] maps field names to [`FieldRule`]s. A rule carries the
//! expected [`FieldKind`], whether the field may be omitted, companion fields
//! it requires when switched on, an optional deprecation notice and an
//! optional fallback returned when a callback field is absent.
//!
//! # Example
//!
//! ```
//! use trellis_registry::schema::{FieldKind, FieldRule, OptionSchema};
//!
//! let schema = OptionSchema::new()
//!     .field("data_key", FieldRule::required(FieldKind::Text))
//!     .field("label", FieldRule::required(FieldKind::Text))
//!     .field(
//!         "multiline",
//!         FieldRule::optional(FieldKind::Bool)
//!             .requires_when_set(["collapse_state_getter", "collapse_state_setter"]),
//!     );
//! assert_eq!(schema.len(), 3);
//! ```

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::option::{Contribution, FieldValue};

/// Custom predicate: `Ok(())` accepts, `Err(reason)` rejects with a message.
pub type FieldCheck = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// FieldKind
// ─────────────────────────────────────────────────────────────────────────────

/// Expected shape of a field.
#[derive(Clone)]
pub enum FieldKind {
    /// A string.
    Text,
    /// A number.
    Number,
    /// A boolean.
    Bool,
    /// A structured object.
    Object,
    /// A list.
    Array,
    /// A callback.
    Function,
    /// Any value.
    Any,
    /// A custom predicate.
    Custom(FieldCheck),
}

impl FieldKind {
    /// Creates a [`Custom`](Self::Custom) kind from a predicate.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(check))
    }

    /// Checks `value` against this kind.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the value does not fit.
    pub fn check(&self, name: &str, value: &FieldValue) -> Result<(), String> {
        let expected = match self {
            Self::Any => return Ok(()),
            Self::Custom(check) => return check(value),
            Self::Text => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Function => "function",
        };
        if value.type_name() == expected {
            Ok(())
        } else {
            Err(format!(
                "option '{name}' must be {expected}, but got {}",
                value.type_name()
            ))
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Number => f.write_str("Number"),
            Self::Bool => f.write_str("Bool"),
            Self::Object => f.write_str("Object"),
            Self::Array => f.write_str("Array"),
            Self::Function => f.write_str("Function"),
            Self::Any => f.write_str("Any"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldRule
// ─────────────────────────────────────────────────────────────────────────────

/// Validation rule for a single field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    kind: FieldKind,
    optional: bool,
    requires: Vec<String>,
    deprecated: Option<String>,
    fallback: Option<Value>,
}

impl FieldRule {
    /// A field that must be present and non-blank.
    #[must_use]
    pub fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: false,
            requires: Vec::new(),
            deprecated: None,
            fallback: None,
        }
    }

    /// A field that may be omitted; when present it must fit `kind`.
    #[must_use]
    pub fn optional(kind: FieldKind) -> Self {
        Self {
            optional: true,
            ..Self::required(kind)
        }
    }

    /// When this field is switched on, every field in `companions` must be present.
    #[must_use]
    pub fn requires_when_set<I, S>(mut self, companions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(companions.into_iter().map(Into::into));
        self
    }

    /// Marks the field as deprecated. Using it logs `notice` but is accepted.
    #[must_use]
    pub fn deprecated(mut self, notice: impl Into<String>) -> Self {
        self.deprecated = Some(notice.into());
        self
    }

    /// Value returned by dispatch when this callback field is absent.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Returns the expected kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns true if the field may be omitted.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the deprecation notice, if any.
    #[must_use]
    pub fn deprecation(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    /// Returns the fallback value, if any.
    #[must_use]
    pub fn fallback(&self) -> Option<&Value> {
        self.fallback.as_ref()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OptionSchema
// ─────────────────────────────────────────────────────────────────────────────

/// Field rules for one registry kind, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    rules: IndexMap<String, FieldRule>,
}

/// Outcome of checking a single option against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Deprecation notices for fields the option used.
    pub deprecations: Vec<String>,
}

impl OptionSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `name`.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Returns the rule for `name`.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    /// Returns the fallback declared for `name`.
    #[must_use]
    pub fn fallback(&self, name: &str) -> Option<&Value> {
        self.rules.get(name).and_then(FieldRule::fallback)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the schema has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks presence, type and conditional requirements of `option`.
    ///
    /// # Errors
    ///
    /// Returns the first failure as a human-readable reason.
    pub fn check<C: Contribution>(&self, option: &C) -> Result<SchemaReport, String> {
        let mut report = SchemaReport::default();

        for (name, rule) in &self.rules {
            let value = option.field(name).filter(|value| !value.is_blank());
            let Some(value) = value else {
                if rule.optional {
                    continue;
                }
                return Err(format!("option must have '{name}'"));
            };

            rule.kind.check(name, &value)?;

            if value.is_truthy() {
                for companion in &rule.requires {
                    let present = option
                        .field(companion)
                        .is_some_and(|companion| !companion.is_blank());
                    if !present {
                        return Err(format!(
                            "option '{name}' is set, so '{companion}' is required"
                        ));
                    }
                }
            }

            if let Some(notice) = &rule.deprecated {
                report
                    .deprecations
                    .push(format!("option '{name}' is deprecated. {notice}"));
            }
        }

        Ok(report)
    }
}
