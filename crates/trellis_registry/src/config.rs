//! Per-registry configuration.

use hashbrown::HashSet;

use crate::namespace::DEFAULT_REPLACEMENT;
use crate::schema::OptionSchema;

/// Static description of one registry kind.
///
/// # Example
///
/// ```
/// use trellis_registry::RegistryConfig;
/// use trellis_registry::schema::{FieldKind, FieldRule, OptionSchema};
///
/// let config = RegistryConfig::new("ItemBoxManager", "data_key")
///     .with_notify_kind("itembox")
///     .with_reserved_keys(["title", "abstractNote"])
///     .with_schema(OptionSchema::new().field("label", FieldRule::required(FieldKind::Text)));
///
/// assert!(config.is_reserved("title"));
/// ```
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    api_name: String,
    main_key: String,
    notify_kind: String,
    reserved_keys: HashSet<String>,
    replacement: char,
    schema: OptionSchema,
}

impl RegistryConfig {
    /// Creates a configuration with an empty schema and no reserved keys.
    ///
    /// * `api_name` - Name used in log events and errors
    /// * `main_key` - Field that carries the registration key
    #[must_use]
    pub fn new(api_name: impl Into<String>, main_key: impl Into<String>) -> Self {
        let api_name = api_name.into();
        Self {
            notify_kind: api_name.to_lowercase(),
            api_name,
            main_key: main_key.into(),
            reserved_keys: HashSet::new(),
            replacement: DEFAULT_REPLACEMENT,
            schema: OptionSchema::new(),
        }
    }

    /// Sets the view kind refreshed after mutations.
    #[must_use]
    pub fn with_notify_kind(mut self, kind: impl Into<String>) -> Self {
        self.notify_kind = kind.into();
        self
    }

    /// Adds built-in keys that contributors may never claim.
    #[must_use]
    pub fn with_reserved_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the character substituted for unsafe key characters.
    #[must_use]
    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.replacement = replacement;
        self
    }

    /// Sets the option schema.
    #[must_use]
    pub fn with_schema(mut self, schema: OptionSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Returns the API name.
    #[must_use]
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Returns the main key field name.
    #[must_use]
    pub fn main_key(&self) -> &str {
        &self.main_key
    }

    /// Returns the notify kind.
    #[must_use]
    pub fn notify_kind(&self) -> &str {
        &self.notify_kind
    }

    /// Returns the replacement character.
    #[must_use]
    pub fn replacement(&self) -> char {
        self.replacement
    }

    /// Returns the option schema.
    #[must_use]
    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    /// Returns true if `key` is a built-in key.
    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.contains(key)
    }

    /// Returns the number of reserved keys.
    #[must_use]
    pub fn reserved_count(&self) -> usize {
        self.reserved_keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_kind_defaults_to_lowercase_api_name() {
        let config = RegistryConfig::new("ItemBox", "data_key");
        assert_eq!(config.notify_kind(), "itembox");
        assert_eq!(config.replacement(), '-');
    }

    #[test]
    fn reserved_keys_accumulate() {
        let config = RegistryConfig::new("ItemPaneManager", "pane_id")
            .with_reserved_keys(["info"])
            .with_reserved_keys(vec!["tags".to_string()]);
        assert!(config.is_reserved("info"));
        assert!(config.is_reserved("tags"));
        assert!(!config.is_reserved("related"));
        assert_eq!(config.reserved_count(), 2);
    }
}
