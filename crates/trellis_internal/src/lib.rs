//! # Trellis Internal Library
//!
//! Re-exports the Trellis crates for convenience.

/// Shared registry machinery.
pub use trellis_registry;

/// Item box rows.
pub use trellis_item_box;

/// Item pane sections.
pub use trellis_item_pane;

/// Item tree columns.
pub use trellis_item_tree;

/// Host, configuration and tracing setup.
pub use trellis_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use trellis_core::{Contributor, Host, HostConfig, HostError, Registries, TracingSetup};
    pub use trellis_item_box::{ItemBoxManager, RowOptions};
    pub use trellis_item_pane::{
        ItemPaneManager, RenderHook, SectionButton, SectionController, SectionHeader,
        SectionOptions,
    };
    pub use trellis_item_tree::{ColumnOptions, ItemTreeManager};
    pub use trellis_registry::{
        ContributorId, ContributorLifecycle, HookError, HookResult, Item, ItemId, OptionFilter,
        RegistryError,
    };
}
