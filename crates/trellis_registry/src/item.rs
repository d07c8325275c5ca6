//! Host item handle passed to contributor data callbacks.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a library item in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An item as seen by contributor callbacks.
///
/// The host owns the real item; contributors only read through this view.
/// Setters receive the same view and are expected to persist through their
/// own storage or through interior mutability on the host side.
pub trait Item: Send + Sync {
    /// Returns the item's identifier.
    fn id(&self) -> ItemId;

    /// Returns the value of a built-in field, if the item has one.
    fn field(&self, _name: &str) -> Option<String> {
        None
    }
}
