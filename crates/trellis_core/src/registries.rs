//! The three registry managers sharing one contributor lifecycle.

use std::sync::Arc;

use trellis_item_box::{ItemBoxManager, row_registry_config};
use trellis_item_pane::{ItemPaneManager, section_registry_config};
use trellis_item_tree::{ItemTreeManager, column_registry_config};
use trellis_registry::{ContributorLifecycle, RegistryConfig};

use crate::config::HostConfig;

/// Item box, item pane and item tree managers wired to a single
/// [`ContributorLifecycle`].
///
/// Shutting a contributor down through [`Registries::lifecycle`] removes its
/// rows, sections and columns in one pass.
#[derive(Debug, Clone)]
pub struct Registries {
    lifecycle: Arc<ContributorLifecycle>,
    item_box: ItemBoxManager,
    item_pane: ItemPaneManager,
    item_tree: ItemTreeManager,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

impl Registries {
    /// Creates the managers with their built-in configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&HostConfig::default())
    }

    /// Creates the managers, adding the configured reserved keys and
    /// replacement character to each built-in configuration.
    #[must_use]
    pub fn from_config(config: &HostConfig) -> Self {
        let lifecycle = Arc::new(ContributorLifecycle::new());
        let apply = |base: RegistryConfig, reserved: &[String]| {
            let base = base.with_reserved_keys(reserved.iter().cloned());
            match config.replacement {
                Some(replacement) => base.with_replacement(replacement),
                None => base,
            }
        };

        Self {
            item_box: ItemBoxManager::with_config(
                apply(row_registry_config(), &config.reserved.rows),
                Arc::clone(&lifecycle),
            ),
            item_pane: ItemPaneManager::with_config(
                apply(section_registry_config(), &config.reserved.panes),
                Arc::clone(&lifecycle),
            ),
            item_tree: ItemTreeManager::with_config(
                apply(column_registry_config(), &config.reserved.columns),
                Arc::clone(&lifecycle),
            ),
            lifecycle,
        }
    }

    /// Returns the shared lifecycle.
    #[must_use]
    pub fn lifecycle(&self) -> &Arc<ContributorLifecycle> {
        &self.lifecycle
    }

    /// Returns the item box row manager.
    #[must_use]
    pub fn item_box(&self) -> &ItemBoxManager {
        &self.item_box
    }

    /// Returns the item pane section manager.
    #[must_use]
    pub fn item_pane(&self) -> &ItemPaneManager {
        &self.item_pane
    }

    /// Returns the item tree column manager.
    #[must_use]
    pub fn item_tree(&self) -> &ItemTreeManager {
        &self.item_tree
    }
}
