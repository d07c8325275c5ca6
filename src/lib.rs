//! Plugin-contribution registries for item detail views.
//!

pub use trellis_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use trellis_internal::prelude::*;
}
