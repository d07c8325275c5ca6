//! Column options contributed to the item tree.

use core::fmt;
use std::sync::Arc;

use trellis_registry::schema::{FieldKind, FieldRule, OptionSchema};
use trellis_registry::{Contribution, ContributorId, DataProvider, FieldValue, Item};

/// Tree id every column is enabled in unless told otherwise.
pub const MAIN_TREE: &str = "main";

/// Tree id wildcard matching every tree.
pub const ALL_TREES: &str = "*";

/// Arguments of a cell renderer.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    /// Row index in the tree.
    pub row_index: usize,
    /// Cell data as returned by the data provider.
    pub data: &'a str,
    /// The column being rendered.
    pub column: &'a ColumnOptions,
    /// True if this is the first visible column.
    pub is_first_column: bool,
}

/// Renders a cell to markup. `None` falls back to the default text cell.
pub type CellRenderer = Arc<dyn Fn(&CellContext<'_>) -> Option<String> + Send + Sync>;

/// A custom column of the item tree.
///
/// Unset optional fields stay `None` so filters treat them as wildcards.
#[derive(Clone)]
pub struct ColumnOptions {
    /// Data key, namespaced on registration.
    pub data_key: String,
    /// Column label.
    pub label: String,
    /// Owning contributor.
    pub plugin_id: ContributorId,
    /// Trees the column is available in. Empty means the main tree only.
    pub enabled_tree_ids: Vec<String>,
    /// Deprecated, use `enabled_tree_ids`.
    pub default_in: Option<Vec<String>>,
    /// Deprecated, use `enabled_tree_ids`.
    pub disable_in: Option<Vec<String>>,
    /// Reverse the sort order.
    pub sort_reverse: Option<bool>,
    /// Flex ratio.
    pub flex: Option<f64>,
    /// Fixed width instead of a flex ratio.
    pub width: Option<String>,
    /// Disable resizing.
    pub fixed_width: Option<bool>,
    /// Keep the width when the tree is resized.
    pub static_width: Option<bool>,
    /// Disable cell padding.
    pub no_padding: Option<bool>,
    /// Minimum width when resizing.
    pub min_width: Option<f64>,
    /// Header icon path.
    pub icon_path: Option<String>,
    /// Header markup, overrides `label`.
    pub html_label: Option<String>,
    /// Show in the column picker. Defaults to true.
    pub show_in_column_picker: Option<bool>,
    /// Show under the "More Columns" submenu.
    pub column_picker_sub_menu: Option<bool>,
    /// Cell data provider.
    pub data_provider: Option<DataProvider>,
    /// Cell renderer.
    pub render_cell: Option<CellRenderer>,
    /// Column properties persisted between sessions.
    pub zotero_persist: Option<Vec<String>>,
}

impl fmt::Debug for ColumnOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnOptions")
            .field("data_key", &self.data_key)
            .field("label", &self.label)
            .field("plugin_id", &self.plugin_id)
            .field("enabled_tree_ids", &self.enabled_tree_ids)
            .field("flex", &self.flex)
            .field("width", &self.width)
            .field("show_in_column_picker", &self.show_in_column_picker)
            .field("data_provider", &self.data_provider.is_some())
            .field("render_cell", &self.render_cell.is_some())
            .finish_non_exhaustive()
    }
}

impl ColumnOptions {
    /// Creates a column with the required fields.
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
            enabled_tree_ids: Vec::new(),
            default_in: None,
            disable_in: None,
            sort_reverse: None,
            flex: None,
            width: None,
            fixed_width: None,
            static_width: None,
            no_padding: None,
            min_width: None,
            icon_path: None,
            html_label: None,
            show_in_column_picker: None,
            column_picker_sub_menu: None,
            data_provider: None,
            render_cell: None,
            zotero_persist: None,
        }
    }

    /// Sets the trees the column is enabled in.
    #[must_use]
    pub fn with_enabled_tree_ids<I, S>(mut self, tree_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_tree_ids = tree_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the flex ratio.
    #[must_use]
    pub fn with_flex(mut self, flex: f64) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Sets a fixed width.
    #[must_use]
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Sets whether the column shows in the column picker.
    #[must_use]
    pub fn with_column_picker(mut self, show: bool) -> Self {
        self.show_in_column_picker = Some(show);
        self
    }

    /// Sets the cell data provider.
    #[must_use]
    pub fn with_data_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&dyn Item, &str) -> String + Send + Sync + 'static,
    {
        self.data_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the cell renderer.
    #[must_use]
    pub fn with_render_cell<F>(mut self, render: F) -> Self
    where
        F: Fn(&CellContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.render_cell = Some(Arc::new(render));
        self
    }

    /// Returns true if the column is enabled in `tree_id`.
    #[must_use]
    pub fn is_enabled_in(&self, tree_id: &str) -> bool {
        self.enabled_tree_ids
            .iter()
            .any(|enabled| enabled == ALL_TREES || enabled == tree_id)
    }
}

impl Contribution for ColumnOptions {
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
        let text = |value: &Option<String>| value.clone().map(FieldValue::Text);
        let list = |value: &Option<Vec<String>>| value.clone().map(FieldValue::List);
        let flag = |value: Option<bool>| value.map(FieldValue::Bool);
        let number = |value: Option<f64>| value.map(FieldValue::Number);
        match name {
            "data_key" => Some(self.data_key.as_str().into()),
            "label" => Some(self.label.as_str().into()),
            "plugin_id" => Some(self.plugin_id.as_str().into()),
            "enabled_tree_ids" => {
                (!self.enabled_tree_ids.is_empty()).then(|| FieldValue::List(self.enabled_tree_ids.clone()))
            }
            "default_in" => list(&self.default_in),
            "disable_in" => list(&self.disable_in),
            "sort_reverse" => flag(self.sort_reverse),
            "flex" => number(self.flex),
            "width" => text(&self.width),
            "fixed_width" => flag(self.fixed_width),
            "static_width" => flag(self.static_width),
            "no_padding" => flag(self.no_padding),
            "min_width" => number(self.min_width),
            "icon_path" => text(&self.icon_path),
            "html_label" => text(&self.html_label),
            "show_in_column_picker" => flag(self.show_in_column_picker),
            "column_picker_sub_menu" => flag(self.column_picker_sub_menu),
            "data_provider" => self.data_provider.as_ref().map(|_| FieldValue::Callback),
            "render_cell" => self.render_cell.as_ref().map(|_| FieldValue::Callback),
            "zotero_persist" => list(&self.zotero_persist),
            _ => None,
        }
    }

    fn prepare(&mut self) {
        if self.enabled_tree_ids.is_empty() {
            self.enabled_tree_ids = vec![MAIN_TREE.to_string()];
        }
        if self.enabled_tree_ids.iter().any(|tree_id| tree_id == ALL_TREES) {
            self.enabled_tree_ids = vec![ALL_TREES.to_string()];
        }
        self.show_in_column_picker.get_or_insert(true);
    }

    fn provide_data(&self, item: &dyn Item, data_key: &str) -> Option<String> {
        self.data_provider
            .as_ref()
            .map(|provider| provider(item, data_key))
    }
}

/// Schema every registered column is checked against.
#[must_use]
pub fn column_schema() -> OptionSchema {
    let deprecated = "Use 'enabled_tree_ids' instead.";
    OptionSchema::new()
        .field("data_key", FieldRule::required(FieldKind::Text))
        .field("label", FieldRule::required(FieldKind::Text))
        .field("plugin_id", FieldRule::required(FieldKind::Text))
        .field("enabled_tree_ids", FieldRule::optional(FieldKind::Array))
        .field(
            "default_in",
            FieldRule::optional(FieldKind::Array).deprecated(deprecated),
        )
        .field(
            "disable_in",
            FieldRule::optional(FieldKind::Array).deprecated(deprecated),
        )
        .field("sort_reverse", FieldRule::optional(FieldKind::Bool))
        .field("flex", FieldRule::optional(FieldKind::Number))
        .field("width", FieldRule::optional(FieldKind::Text))
        .field("fixed_width", FieldRule::optional(FieldKind::Bool))
        .field("static_width", FieldRule::optional(FieldKind::Bool))
        .field("no_padding", FieldRule::optional(FieldKind::Bool))
        .field("min_width", FieldRule::optional(FieldKind::Number))
        .field("icon_path", FieldRule::optional(FieldKind::Text))
        .field("html_label", FieldRule::optional(FieldKind::Any))
        .field("show_in_column_picker", FieldRule::optional(FieldKind::Bool))
        .field("column_picker_sub_menu", FieldRule::optional(FieldKind::Bool))
        .field(
            "data_provider",
            FieldRule::optional(FieldKind::Function).with_fallback(""),
        )
        .field(
            "render_cell",
            FieldRule::optional(FieldKind::Function).with_fallback(serde_json::Value::Null),
        )
        .field("zotero_persist", FieldRule::optional(FieldKind::Array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_defaults_to_main_tree_and_picker() {
        let mut column = ColumnOptions::new("pages", "Pages", "p1");
        column.prepare();

        assert_eq!(column.enabled_tree_ids, vec![MAIN_TREE]);
        assert_eq!(column.show_in_column_picker, Some(true));
        assert!(column.is_enabled_in("main"));
        assert!(!column.is_enabled_in("feed"));
    }

    #[test]
    fn wildcard_tree_id_collapses() {
        let mut column =
            ColumnOptions::new("pages", "Pages", "p1").with_enabled_tree_ids(["feed", "*", "main"]);
        column.prepare();

        assert_eq!(column.enabled_tree_ids, vec![ALL_TREES]);
        assert!(column.is_enabled_in("anything"));
    }

    #[test]
    fn explicit_picker_setting_is_kept() {
        let mut column = ColumnOptions::new("pages", "Pages", "p1").with_column_picker(false);
        column.prepare();
        assert_eq!(column.show_in_column_picker, Some(false));
    }

    #[test]
    fn deprecated_fields_are_reported_not_rejected() {
        let mut column = ColumnOptions::new("pages", "Pages", "p1");
        column.default_in = Some(vec!["default".into()]);

        let report = column_schema().check(&column).unwrap();
        assert_eq!(report.deprecations.len(), 1);
        assert!(report.deprecations[0].contains("default_in"));
    }
}
