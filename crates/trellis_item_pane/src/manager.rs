//! Section registry of the item pane.

use std::sync::Arc;

use trellis_registry::{
    ContributionRegistry, ContributorLifecycle, OptionFilter, RegistryConfig, RegistryError,
};

use crate::controller::SectionController;
use crate::section::{SectionOptions, section_schema};

/// API name used in log events and errors.
pub const API_NAME: &str = "ItemPaneManager";

/// View kind refreshed after section changes.
pub const NOTIFY_KIND: &str = "itempane";

/// Built-in pane ids. Sections can never claim these.
pub const BUILTIN_PANE_IDS: &[&str] = &[
    "info",
    "abstract",
    "attachments",
    "notes",
    "attachment-info",
    "attachment-annotations",
    "libraries-collections",
    "tags",
    "related",
];

/// Returns the default section registry configuration.
#[must_use]
pub fn section_registry_config() -> RegistryConfig {
    RegistryConfig::new(API_NAME, "pane_id")
        .with_notify_kind(NOTIFY_KIND)
        .with_reserved_keys(BUILTIN_PANE_IDS.iter().copied())
        .with_schema(section_schema())
}

/// Registry of custom item pane sections.
#[derive(Debug, Clone)]
pub struct ItemPaneManager {
    sections: Arc<ContributionRegistry<SectionOptions>>,
}

impl ItemPaneManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new(lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self::with_config(section_registry_config(), lifecycle)
    }

    /// Creates a manager with a custom configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig, lifecycle: Arc<ContributorLifecycle>) -> Self {
        Self {
            sections: ContributionRegistry::new(config, lifecycle),
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ContributionRegistry<SectionOptions>> {
        &self.sections
    }

    /// Registers sections and returns their namespaced pane ids.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if any section is invalid.
    pub async fn register_sections(
        &self,
        sections: Vec<SectionOptions>,
    ) -> Result<Vec<String>, RegistryError> {
        self.sections.register(sections).await
    }

    /// Registers one section and returns its namespaced pane id.
    ///
    /// # Errors
    ///
    /// See [`register_sections`](Self::register_sections).
    pub async fn register_section(&self, section: SectionOptions) -> Result<String, RegistryError> {
        self.sections.register_one(section).await
    }

    /// Unregisters sections by namespaced pane id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if any id is unknown.
    pub async fn unregister_sections<K: AsRef<str>>(&self, pane_ids: &[K]) -> Result<(), RegistryError> {
        self.sections.unregister(pane_ids).await
    }

    /// Returns the version of the section set.
    #[must_use]
    pub fn get_update_time(&self) -> u64 {
        self.sections.version()
    }

    /// Returns copies of the registered sections.
    #[must_use]
    pub fn get_custom_sections(&self, filter: Option<&OptionFilter>) -> Vec<SectionOptions> {
        match filter {
            Some(filter) => self.sections.query(filter),
            None => self.sections.entries(),
        }
    }

    /// Returns true if `pane_id` is a registered custom section.
    #[must_use]
    pub fn is_custom_section(&self, pane_id: &str) -> bool {
        self.sections.is_registered(pane_id)
    }

    /// Builds an uninitialized controller over a copy of the section.
    #[must_use]
    pub fn create_section(&self, pane_id: &str) -> Option<SectionController> {
        self.sections.get(pane_id).map(SectionController::new)
    }
}
