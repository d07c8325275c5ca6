use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use trellis_item_box::ItemBoxManager;
use trellis_registry::{HookError, Item, RefreshTarget};

/// A live item box listing custom rows for one item.
///
/// Re-renders whenever the row registry changes.
pub struct RowListView {
    rows: ItemBoxManager,
    item: Arc<dyn Item>,
    lines: RwLock<Vec<String>>,
}

impl core::fmt::Debug for RowListView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RowListView")
            .field("item", &self.item.id())
            .field("lines", &self.lines.read().len())
            .finish_non_exhaustive()
    }
}

impl RowListView {
    /// Creates the view and renders it once.
    #[must_use]
    pub fn new(rows: ItemBoxManager, item: Arc<dyn Item>) -> Self {
        let view = Self {
            rows,
            item,
            lines: RwLock::new(Vec::new()),
        };
        view.render();
        view
    }

    /// Returns the rendered lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }

    fn render(&self) {
        let lines = self
            .rows
            .ordered_rows()
            .into_iter()
            .map(|row| {
                let value = self.rows.get_custom_row_data(self.item.as_ref(), &row.data_key);
                format!("{}: {value}", row.label)
            })
            .collect();
        *self.lines.write() = lines;
    }
}

#[async_trait]
impl RefreshTarget for RowListView {
    async fn refresh(&self) -> Result<(), HookError> {
        self.render();
        tracing::debug!(item = %self.item.id(), rows = self.lines.read().len(), "row list refreshed");
        Ok(())
    }
}
