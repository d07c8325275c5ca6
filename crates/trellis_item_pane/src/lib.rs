//! Custom item pane sections.
//!
//! [`ItemPaneManager`] stores the sections contributors register. Each live
//! section in a view is driven by a [`SectionController`], built from a copy
//! of the registered options with [`ItemPaneManager::create_section`].
//!
//! # Hooks
//!
//! | Hook | When |
//! |------|------|
//! | `on_init` | once, from [`SectionController::init`] |
//! | `on_render` | per item, from [`SectionController::render`] |
//! | `on_secondary_render` | per item, after primary render |
//! | `on_data_change` | before bound data changes; `false` vetoes |
//! | `on_toggle` | on expand or collapse |
//! | `on_destroy` | once, from [`SectionController::destroy`] |

pub mod context;
pub mod controller;
pub mod error;
pub mod manager;
pub mod section;

pub use context::{
    ButtonEvent, DataChange, DestroyContext, InitContext, RefreshHandle, SectionContext,
    SectionData, TabType, ToggleEvent, ViewMode,
};
pub use controller::{RenderOutcome, SectionController, SectionRuntimeState, SectionState};
pub use error::SectionError;
pub use manager::{BUILTIN_PANE_IDS, ItemPaneManager, section_registry_config};
pub use section::{
    RenderHook, RenderMode, SectionButton, SectionHeader, SectionOptions, section_schema,
};
