//! Custom rows of the item metadata box.
//!
//! Contributors register [`RowOptions`] with an [`ItemBoxManager`]; the item
//! box reads rows back through [`ItemBoxManager::ordered_rows`] and routes
//! row values through the row's data callbacks.

pub mod manager;
pub mod row;

pub use manager::{BUILTIN_FIELDS, ItemBoxManager, row_registry_config};
pub use row::{CollapseStateGetter, CollapseStateSetter, RowOptions, row_schema};
