//! Row options contributed to the item box.

use core::fmt;
use std::sync::Arc;

use trellis_registry::schema::{FieldKind, FieldRule, OptionSchema};
use trellis_registry::{Contribution, ContributorId, DataProvider, DataSetter, FieldValue, Item};

/// Returns true if the row is collapsed for the item.
pub type CollapseStateGetter = Arc<dyn Fn(&dyn Item, &str) -> bool + Send + Sync>;

/// Persists the collapsed state of a row for the item.
pub type CollapseStateSetter = Arc<dyn Fn(&dyn Item, &str, bool) + Send + Sync>;

/// A custom row of the item metadata box.
///
/// Rows with a lower `index` are shown first. Rows without an index are
/// appended after every indexed row. Index `1` is the first slot after the
/// item type, title and creators.
///
/// # Example
///
/// ```
/// use trellis_item_box::RowOptions;
///
/// let row = RowOptions::new("color", "Color", "p1")
///     .with_index(2)
///     .editable()
///     .with_data_provider(|_item, _key| "red".to_string());
/// assert_eq!(row.index, Some(2));
/// ```
#[derive(Clone)]
pub struct RowOptions {
    /// Data key, namespaced on registration.
    pub data_key: String,
    /// Label shown in the item box.
    pub label: String,
    /// Owning contributor; its rows are removed when it shuts down.
    pub plugin_id: ContributorId,
    /// Display position.
    pub index: Option<u32>,
    /// Whether the row can be edited.
    pub editable: bool,
    /// Whether the row spans multiple lines and can collapse.
    pub multiline: bool,
    /// Called when rendering the row.
    pub data_provider: Option<DataProvider>,
    /// Called when the row is edited.
    pub data_setter: Option<DataSetter>,
    /// Collapse state getter, required for multiline rows.
    pub collapse_state_getter: Option<CollapseStateGetter>,
    /// Collapse state setter, required for multiline rows.
    pub collapse_state_setter: Option<CollapseStateSetter>,
}

impl fmt::Debug for RowOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowOptions")
            .field("data_key", &self.data_key)
            .field("label", &self.label)
            .field("plugin_id", &self.plugin_id)
            .field("index", &self.index)
            .field("editable", &self.editable)
            .field("multiline", &self.multiline)
            .field("data_provider", &self.data_provider.is_some())
            .field("data_setter", &self.data_setter.is_some())
            .finish_non_exhaustive()
    }
}

impl RowOptions {
    /// Creates a single-line, read-only row.
    #[must_use]
    pub fn new(
        data_key: impl Into<String>,
        label: impl Into<String>,
        plugin_id: impl Into<ContributorId>,
    ) -> Self {
        Self {
            data_key: data_key.into(),
            label: label.into(),
            plugin_id: plugin_id.into(),
            index: None,
            editable: false,
            multiline: false,
            data_provider: None,
            data_setter: None,
            collapse_state_getter: None,
            collapse_state_setter: None,
        }
    }

    /// Sets the display position.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Makes the row editable.
    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Makes the row multiline. Registration fails unless both collapse
    /// callbacks are set as well.
    #[must_use]
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// Sets the data provider.
    #[must_use]
    pub fn with_data_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&dyn Item, &str) -> String + Send + Sync + 'static,
    {
        self.data_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the data setter.
    #[must_use]
    pub fn with_data_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&dyn Item, &str, &str) + Send + Sync + 'static,
    {
        self.data_setter = Some(Arc::new(setter));
        self
    }

    /// Sets both collapse state callbacks.
    #[must_use]
    pub fn with_collapse_state<G, S>(mut self, getter: G, setter: S) -> Self
    where
        G: Fn(&dyn Item, &str) -> bool + Send + Sync + 'static,
        S: Fn(&dyn Item, &str, bool) + Send + Sync + 'static,
    {
        self.collapse_state_getter = Some(Arc::new(getter));
        self.collapse_state_setter = Some(Arc::new(setter));
        self
    }
}

impl Contribution for RowOptions {
    fn key(&self) -> &str {
        &self.data_key
    }

    fn set_key(&mut self, key: String) {
        self.data_key = key;
    }

    fn contributor_id(&self) -> &ContributorId {
        &self.plugin_id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let callback = |set: bool| set.then_some(FieldValue::Callback);
        match name {
            "data_key" => Some(self.data_key.as_str().into()),
            "label" => Some(self.label.as_str().into()),
            "plugin_id" => Some(self.plugin_id.as_str().into()),
            "index" => self.index.map(FieldValue::from),
            "editable" => Some(self.editable.into()),
            "multiline" => Some(self.multiline.into()),
            "data_provider" => callback(self.data_provider.is_some()),
            "data_setter" => callback(self.data_setter.is_some()),
            "collapse_state_getter" => callback(self.collapse_state_getter.is_some()),
            "collapse_state_setter" => callback(self.collapse_state_setter.is_some()),
            _ => None,
        }
    }

    fn provide_data(&self, item: &dyn Item, data_key: &str) -> Option<String> {
        self.data_provider
            .as_ref()
            .map(|provider| provider(item, data_key))
    }

    fn store_data(&self, item: &dyn Item, data_key: &str, value: &str) -> bool {
        self.data_setter.as_ref().is_some_and(|setter| {
            setter(item, data_key, value);
            true
        })
    }
}

/// Schema every registered row is checked against.
#[must_use]
pub fn row_schema() -> OptionSchema {
    OptionSchema::new()
        .field("data_key", FieldRule::required(FieldKind::Text))
        .field("label", FieldRule::required(FieldKind::Text))
        .field("plugin_id", FieldRule::required(FieldKind::Text))
        .field("index", FieldRule::optional(FieldKind::Number))
        .field("editable", FieldRule::optional(FieldKind::Bool))
        .field(
            "multiline",
            FieldRule::optional(FieldKind::Bool)
                .requires_when_set(["collapse_state_getter", "collapse_state_setter"]),
        )
        .field(
            "data_provider",
            FieldRule::optional(FieldKind::Function).with_fallback(""),
        )
        .field("data_setter", FieldRule::optional(FieldKind::Function))
        .field("collapse_state_getter", FieldRule::optional(FieldKind::Function))
        .field("collapse_state_setter", FieldRule::optional(FieldKind::Function))
}
