//! Stored preference domain module.

mod model;
mod repository;

pub use model::PreferenceKey;
pub use repository::PreferenceStore;
