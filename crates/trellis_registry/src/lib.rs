//! Plugin-contribution registries for Trellis.
//!
//! This crate provides the machinery shared by every registry kind (item box
//! rows, item pane sections, item tree columns): contributors hand in option
//! structs, the registry validates and namespaces them, stores independent
//! copies, tracks a version, removes a contributor's entries when it shuts
//! down and asks live views to refresh after every change.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis_registry::{ContributionRegistry, ContributorLifecycle, RegistryConfig};
//!
//! let lifecycle = Arc::new(ContributorLifecycle::new());
//! let rows = ContributionRegistry::<RowOptions>::new(row_config(), Arc::clone(&lifecycle));
//!
//! // Contributor registers a row; the key comes back namespaced.
//! let key = rows.register_one(RowOptions::new("color", "Color", "p1")).await?;
//! assert_eq!(key, "p1-color");
//!
//! // Contributor shuts down; its rows disappear.
//! lifecycle.shutdown(&"p1".into()).await;
//! assert!(rows.is_empty());
//! ```
//!
//! # Architecture
//!
//! - [`namespace`]: contributor ids and collision-safe keys
//! - [`schema`] / [`validate`]: schema-driven batch validation
//! - [`registry`]: [`ContributionRegistry`], the versioned store
//! - [`lifecycle`]: [`ContributorLifecycle`], shutdown subscription point
//! - [`notify`]: [`ViewNotifier`], isolated refresh of live views

pub mod config;
pub mod error;
pub mod item;
pub mod lifecycle;
pub mod namespace;
pub mod notify;
pub mod option;
pub mod registry;
pub mod schema;
pub mod validate;

pub use config::RegistryConfig;
pub use error::{HookError, HookResult, RegistryError};
pub use item::{Item, ItemId};
pub use lifecycle::{ContributorLifecycle, ShutdownObserver};
pub use namespace::{ContributorId, namespaced_key, sanitize_identifier};
pub use notify::{RefreshReport, RefreshTarget, ViewId, ViewNotifier};
pub use option::{Contribution, DataProvider, DataSetter, FieldValue, OptionFilter};
pub use registry::ContributionRegistry;
pub use schema::{FieldKind, FieldRule, OptionSchema};
pub use validate::OptionValidator;
