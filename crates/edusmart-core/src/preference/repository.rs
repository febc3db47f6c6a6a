//! Preference store port.

use async_trait::async_trait;

use crate::error::Result;

/// Small durable key-value store for user preferences.
///
/// Implementations must survive restarts when backed by disk; the in-memory
/// implementation is the fallback for tests and non-persistent targets.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
