//! Column registry of the item tree.

use std::sync::Arc;

use hashbrown::HashSet;
use trellis_registry::{
    ContributionRegistry, ContributorLifecycle, Item, OptionFilter, RegistryConfig, RegistryError,
};

use crate::column::{ALL_TREES, CellContext, ColumnOptions, column_schema};

/// API name used in log events and errors.
pub const API_NAME: &str = "ItemTreeColumnManager";

/// View kind refreshed after column changes.
pub const NOTIFY_KIND: &str = "itemtree";

/// Data keys of the built-in columns.
pub const BUILTIN_COLUMNS: &[&str] = &[
    "title",
    "firstCreator",
    "itemType",
    "date",
    "year",
    "publisher",
    "publicationTitle",
    "journalAbbreviation",
    "language",
    "accessDate",
    "libraryCatalog",
    "callNumber",
    "rights",
    "dateAdded",
    "dateModified",
    "archive",
    "archiveLocation",
    "place",
    "volume",
    "edition",
    "number",
    "pages",
    "issue",
    "series",
    "seriesTitle",
    "court",
    "medium",
    "genre",
    "system",
    "shortTitle",
    "extra",
    "hasAttachment",
    "numNotes",
    "feed",
];

/// Returns the default column registry configuration.
#[must_use]
pub fn column_registry_config() -> RegistryConfig {
    RegistryConfig::new(API_NAME, "data_key")
        .with_notify_kind(NOTIFY_KIND)
        .with_reserved_keys(BUILTIN_COLUMNS.iter().copied())
        .with_schema(column_schema())
}

/// Registry of custom item tree columns.
#[derive(Debug, Clone)]
pub struct ItemTreeManager {
    columns: Arc<ContributionRegistry<ColumnOptions>>,
}

impl ItemTreeManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new(lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self::with_config(column_registry_config(), lifecycle)
    }

    /// Creates a manager with a custom configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig, lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self {
            columns: ContributionRegistry::new(config, lifecycle),
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ContributionRegistry<ColumnOptions>> {
        &self.columns
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a column and returns its namespaced data key.
    ///
    /// The returned key differs from the one passed in: it is prefixed with
    /// the plugin id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if the column is invalid, clashes
    /// with a built-in column or is already registered.
    pub async fn register_column(&self, column: ColumnOptions) -> Result<String, RegistryError> {
        self.columns.register_one(column).await
    }

    /// Registers columns one by one.
    ///
    /// Not atomic: each column succeeds or fails on its own.
    #[deprecated(note = "use `register_column` instead")]
    pub async fn register_columns(
        &self,
        columns: Vec<ColumnOptions>,
    ) -> Vec<Result<String, RegistryError>> {
        tracing::warn!(api = API_NAME, "register_columns is deprecated, use register_column");
        let mut results = Vec::with_capacity(columns.len());
        for column in columns {
            results.push(self.register_column(column).await);
        }
        results
    }

    /// Unregisters a column by namespaced data key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the key is unknown.
    pub async fn unregister_column(&self, data_key: &str) -> Result<(), RegistryError> {
        self.columns.unregister(&[data_key]).await
    }

    /// Unregisters columns one by one.
    #[deprecated(note = "use `unregister_column` instead")]
    pub async fn unregister_columns<K: AsRef<str>>(
        &self,
        data_keys: &[K],
    ) -> Vec<Result<(), RegistryError>> {
        tracing::warn!(api = API_NAME, "unregister_columns is deprecated, use unregister_column");
        let mut results = Vec::with_capacity(data_keys.len());
        for data_key in data_keys {
            results.push(self.unregister_column(data_key.as_ref()).await);
        }
        results
    }

    /// Asks every live item tree to reload its columns.
    pub async fn refresh_columns(&self) {
        self.columns.refresh().await;
    }

    /// Returns a value that changes whenever the column set changes.
    #[must_use]
    pub fn custom_column_update_id(&self) -> u64 {
        self.columns.version()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Returns copies of the registered columns.
    ///
    /// * `tree_ids` - Keep columns enabled in any of these trees. `None` or
    ///   a list containing `"*"` keeps every column.
    /// * `filter` - Exact-match filter on column fields.
    #[must_use]
    pub fn get_custom_columns(
        &self,
        tree_ids: Option<&[&str]>,
        filter: Option<&OptionFilter>,
    ) -> Vec<ColumnOptions> {
        let mut columns = match filter {
            Some(filter) => self.columns.query(filter),
            None => self.columns.entries(),
        };
        if let Some(tree_ids) = tree_ids.filter(|ids| !ids.contains(&ALL_TREES)) {
            let wanted: HashSet<&str> = tree_ids.iter().copied().collect();
            columns.retain(|column| {
                column
                    .enabled_tree_ids
                    .iter()
                    .any(|tree_id| tree_id == ALL_TREES || wanted.contains(tree_id.as_str()))
            });
        }
        columns
    }

    /// Returns true if `data_key` is a registered custom column.
    #[must_use]
    pub fn is_custom_column(&self, data_key: &str) -> bool {
        self.columns.is_registered(data_key)
    }

    /// Returns the cell text for `item`, or `""` without a data provider.
    #[must_use]
    pub fn get_custom_cell_data(&self, item: &dyn Item, data_key: &str) -> String {
        self.columns.get_data(item, data_key)
    }

    /// Renders a cell with the column's renderer.
    ///
    /// `None` if the column is unknown or has no renderer; the tree then
    /// renders a plain text cell.
    #[must_use]
    pub fn render_custom_cell(
        &self,
        data_key: &str,
        row_index: usize,
        data: &str,
        is_first_column: bool,
    ) -> Option<String> {
        let column = self.columns.get(data_key)?;
        let render = column.render_cell.clone()?;
        render(&CellContext {
            row_index,
            data,
            column: &column,
            is_first_column,
        })
    }
}
