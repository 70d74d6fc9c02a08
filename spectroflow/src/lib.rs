//! Umbrella crate re-exporting the spectroflow public API.
//!
//! Depend on this crate for the whole engine surface; depend on
//! `spectroflow-core` directly if you only need the core types.

pub use spectroflow_core::*;

/// The engine modules, re-exported under their own paths.
pub mod core {
    pub use spectroflow_core::{container, error, ops, parallel, shape};
}
