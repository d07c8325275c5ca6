//! Row registry of the item metadata box.

use std::sync::Arc;

use trellis_registry::{
    ContributionRegistry, ContributorLifecycle, Item, OptionFilter, RegistryConfig, RegistryError,
};

use crate::row::{RowOptions, row_schema};

/// API name used in log events and errors.
pub const API_NAME: &str = "ItemBoxManager";

/// View kind refreshed after row changes.
pub const NOTIFY_KIND: &str = "itembox";

/// Built-in item field names. Rows can never claim these keys.
pub const BUILTIN_FIELDS: &[&str] = &[
    "itemType",
    "title",
    "creators",
    "abstractNote",
    "publicationTitle",
    "volume",
    "issue",
    "pages",
    "date",
    "series",
    "seriesTitle",
    "seriesText",
    "journalAbbreviation",
    "language",
    "DOI",
    "ISSN",
    "ISBN",
    "shortTitle",
    "url",
    "accessDate",
    "archive",
    "archiveLocation",
    "libraryCatalog",
    "callNumber",
    "rights",
    "extra",
    "publisher",
    "place",
    "edition",
    "numPages",
    "numberOfVolumes",
    "section",
    "medium",
    "type",
    "number",
    "genre",
    "institution",
    "university",
    "websiteTitle",
    "dateAdded",
    "dateModified",
];

/// Returns the default row registry configuration.
#[must_use]
pub fn row_registry_config() -> RegistryConfig {
    RegistryConfig::new(API_NAME, "data_key")
        .with_notify_kind(NOTIFY_KIND)
        .with_reserved_keys(BUILTIN_FIELDS.iter().copied())
        .with_schema(row_schema())
}

/// Registry of custom item box rows.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Debug, Clone)]
pub struct ItemBoxManager {
    rows: Arc<ContributionRegistry<RowOptions>>,
}

impl ItemBoxManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new(lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self::with_config(row_registry_config(), lifecycle)
    }

    /// Creates a manager with a custom configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig, lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self {
            rows: ContributionRegistry::new(config, lifecycle),
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ContributionRegistry<RowOptions>> {
        &self.rows
    }

    /// Returns the registry version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.rows.version()
    }

    /// Registers a batch of rows and returns their namespaced data keys.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if any row is invalid. No row
    /// of the batch is registered in that case.
    pub async fn register_rows(&self, rows: Vec<RowOptions>) -> Result<Vec<String>, RegistryError> {
        self.rows.register(rows).await
    }

    /// Registers one row and returns its namespaced data key.
    ///
    /// # Errors
    ///
    /// See [`register_rows`](Self::register_rows).
    pub async fn register_row(&self, row: RowOptions) -> Result<String, RegistryError> {
        self.rows.register_one(row).await
    }

    /// Unregisters rows by namespaced data key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if any key is unknown. No row is
    /// removed in that case.
    pub async fn unregister_rows<K: AsRef<str>>(&self, data_keys: &[K]) -> Result<(), RegistryError> {
        self.rows.unregister(data_keys).await
    }

    /// Returns copies of the rows matching `filter`, in registration order.
    #[must_use]
    pub fn get_custom_rows(&self, filter: Option<&OptionFilter>) -> Vec<RowOptions> {
        match filter {
            Some(filter) => self.rows.query(filter),
            None => self.rows.entries(),
        }
    }

    /// Returns rows in display order.
    ///
    /// Indexed rows come first by ascending index, unindexed rows follow.
    /// Rows with the same index keep their registration order.
    #[must_use]
    pub fn ordered_rows(&self) -> Vec<RowOptions> {
        let mut rows = self.rows.entries();
        rows.sort_by_key(|row| row.index.map_or((1, 0), |index| (0, index)));
        rows
    }

    /// Returns true if `data_key` is a registered custom row.
    #[must_use]
    pub fn is_custom_row(&self, data_key: &str) -> bool {
        self.rows.is_registered(data_key)
    }

    /// Returns the row's value for `item`, or `""` without a provider.
    #[must_use]
    pub fn get_custom_row_data(&self, item: &dyn Item, data_key: &str) -> String {
        self.rows.get_data(item, data_key)
    }

    /// Stores an edited value. Returns false without a data setter.
    pub fn set_custom_row_data(&self, item: &dyn Item, data_key: &str, value: &str) -> bool {
        self.rows.set_data(item, data_key, value)
    }

    /// Returns the collapsed state of a multiline row.
    ///
    /// `None` if the row is unknown or has no collapse state getter.
    #[must_use]
    pub fn get_collapse_state(&self, item: &dyn Item, data_key: &str) -> Option<bool> {
        let row = self.rows.get(data_key)?;
        let getter = row.collapse_state_getter?;
        Some(getter(item, data_key))
    }

    /// Persists the collapsed state of a multiline row.
    ///
    /// Returns false if the row is unknown or has no collapse state setter.
    pub fn set_collapse_state(&self, item: &dyn Item, data_key: &str, collapsed: bool) -> bool {
        let Some(setter) = self
            .rows
            .get(data_key)
            .and_then(|row| row.collapse_state_setter)
        else {
            tracing::debug!(api = API_NAME, key = data_key, "no collapse state setter");
            return false;
        };
        setter(item, data_key, collapsed);
        true
    }
}
