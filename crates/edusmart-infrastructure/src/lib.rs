//! Infrastructure layer for the EduSmart client.
//!
//! File-backed implementations of the persistence ports defined in
//! `edusmart-core`: preferences, the persisted session and client config.

pub mod config_loader;
pub mod credential_store;
pub mod paths;
pub mod preference_store;
pub mod storage;

pub use config_loader::ConfigLoader;
pub use credential_store::{InMemoryCredentialStore, JsonCredentialStore};
pub use paths::{EduPaths, PathError};
pub use preference_store::{InMemoryPreferenceStore, TomlPreferenceStore};
