//! Registration options and their field view.
//!
//! Each registry kind defines its own strongly typed option struct (rows,
//! panes, columns) and implements [`Contribution`] for it. The trait exposes
//! the struct's fields by name as [`FieldValue`]s, which is what the schema
//! validator and the query filter operate on.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::item::Item;
use crate::namespace::ContributorId;

/// Name of the field that carries the data-provider callback.
pub const DATA_PROVIDER_FIELD: &str = "data_provider";

/// Callback returning the display value of `data_key` for an item.
pub type DataProvider = Arc<dyn Fn(&dyn Item, &str) -> String + Send + Sync>;

/// Callback storing an edited value of `data_key` for an item.
pub type DataSetter = Arc<dyn Fn(&dyn Item, &str, &str) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// FieldValue
// ─────────────────────────────────────────────────────────────────────────────

/// A single option field as seen by validation and filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A string.
    Text(String),
    /// A number.
    Number(f64),
    /// A boolean.
    Bool(bool),
    /// A list of strings.
    List(Vec<String>),
    /// A structured object.
    Object(Value),
    /// A contributor callback. Callbacks never compare equal to filter values.
    Callback,
}

impl FieldValue {
    /// Returns the schema type name of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::List(_) => "array",
            Self::Object(_) => "object",
            Self::Callback => "function",
        }
    }

    /// Returns true for values that count as "not provided" for required fields.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Object(value) => value.is_null(),
            _ => false,
        }
    }

    /// Returns true for values that switch on a conditional requirement.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => !text.is_empty(),
            Self::Number(n) => *n != 0.0,
            Self::Object(value) => !value.is_null(),
            Self::List(_) | Self::Callback => true,
        }
    }

    /// Converts the value to JSON for comparison. Callbacks have no JSON form.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Text(text) => Some(Value::String(text.clone())),
            Self::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            Self::Bool(flag) => Some(Value::Bool(*flag)),
            Self::List(items) => Some(Value::Array(
                items.iter().cloned().map(Value::String).collect(),
            )),
            Self::Object(value) => Some(value.clone()),
            Self::Callback => None,
        }
    }

    /// Returns true if this value equals the filter value.
    #[must_use]
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (Self::Number(n), Value::Number(m)) => m.as_f64().is_some_and(|m| m == *n),
            _ => self.to_json().is_some_and(|value| &value == expected),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Contribution
// ─────────────────────────────────────────────────────────────────────────────

/// An option struct that can be stored in a
/// [`ContributionRegistry`](crate::registry::ContributionRegistry).
///
/// `Clone` must produce an independent copy of all data fields; callbacks are
/// shared behind `Arc` since they are immutable.
pub trait Contribution: Clone + Send + Sync + 'static {
    /// Returns the main key (raw before registration, namespaced after).
    fn key(&self) -> &str;

    /// Replaces the main key. Called by the registry with the namespaced key.
    fn set_key(&mut self, key: String);

    /// Returns the owning contributor.
    fn contributor_id(&self) -> &ContributorId;

    /// Returns a field by name, or `None` if the field is absent.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Normalizes defaults before validation.
    fn prepare(&mut self) {}

    /// Returns the entry's data for an item, if it has a data provider.
    fn provide_data(&self, _item: &dyn Item, _data_key: &str) -> Option<String> {
        None
    }

    /// Stores an edited value through the entry's data setter.
    ///
    /// Returns false if the entry has no setter.
    fn store_data(&self, _item: &dyn Item, _data_key: &str, _value: &str) -> bool {
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OptionFilter
// ─────────────────────────────────────────────────────────────────────────────

/// Exact-match filter over option fields.
///
/// A field listed with no value is a wildcard and matches every entry; this is
/// how a caller passes "undefined" for a field. Fields the entry itself never
/// set are wildcards too.
///
/// # Example
///
/// ```
/// use trellis_registry::OptionFilter;
///
/// let filter = OptionFilter::new()
///     .with("plugin_id", "p1")
///     .with_wildcard("label");
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionFilter {
    fields: IndexMap<String, Option<Value>>,
}

impl OptionFilter {
    /// Creates an empty filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field` to equal `value`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }

    /// Lists `field` without a value; it matches every entry.
    #[must_use]
    pub fn with_wildcard(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), None);
        self
    }

    /// Sets `field` from an optional value; `None` is a wildcard.
    #[must_use]
    pub fn with_optional(mut self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        self.fields.insert(field.into(), value.map(Into::into));
        self
    }

    /// Returns the number of listed fields, wildcards included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if `option` satisfies every listed field.
    #[must_use]
    pub fn matches<C: Contribution>(&self, option: &C) -> bool {
        self.fields.iter().all(|(name, expected)| {
            let Some(expected) = expected else {
                return true;
            };
            match option.field(name) {
                Some(actual) => actual.matches(expected),
                None => true,
            }
        })
    }
}
