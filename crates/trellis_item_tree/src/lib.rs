//! Custom columns of the item tree.

pub mod column;
pub mod manager;

pub use column::{ALL_TREES, CellContext, CellRenderer, ColumnOptions, MAIN_TREE, column_schema};
pub use manager::{BUILTIN_COLUMNS, ItemTreeManager, column_registry_config};
