//! Preference store implementations.
//!
//! `TomlPreferenceStore` persists to `preferences.toml` and keeps an in-memory
//! copy so reads never touch the disk. `InMemoryPreferenceStore` is the
//! fallback when no durable storage is available.

use crate::paths::EduPaths;
use crate::storage::AtomicTomlFile;
use edusmart_core::error::{EduError, Result};
use edusmart_core::preference::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// On-disk layout of `preferences.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Durable preference store backed by an atomic TOML file.
#[derive(Clone)]
pub struct TomlPreferenceStore {
    cache: Arc<Mutex<BTreeMap<String, String>>>,
    file: Arc<AtomicTomlFile<PreferenceFile>>,
}

impl TomlPreferenceStore {
    /// Opens the store at the default location.
    pub async fn new() -> Result<Self> {
        Self::with_path(EduPaths::preferences_file()?).await
    }

    /// Opens the store at `path`, loading existing entries.
    pub async fn with_path(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<PreferenceFile>::new(path));
        let loader = file.clone();
        let initial = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| EduError::internal(format!("Failed to join task: {}", e)))??
            .unwrap_or_default();

        tracing::debug!(
            "[PreferenceStore] Loaded {} entries from {}",
            initial.entries.len(),
            file.path().display()
        );

        Ok(Self {
            cache: Arc::new(Mutex::new(initial.entries)),
            file,
        })
    }

    /// Applies `change` to the cached map and writes the result to disk.
    ///
    /// The cache lock is held across the write so concurrent writers are
    /// applied to disk in the same order as in memory.
    async fn write<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut cache = self.cache.lock().await;
        let mut next = cache.clone();
        change(&mut next);

        let file = self.file.clone();
        let snapshot = next.clone();
        tokio::task::spawn_blocking(move || {
            file.update(PreferenceFile::default(), |data| {
                data.entries = snapshot;
                Ok(())
            })
        })
        .await
        .map_err(|e| EduError::internal(format!("Failed to join task: {}", e)))??;

        *cache = next;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PreferenceStore for TomlPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.write(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if !self.cache.lock().await.contains_key(key) {
            return Ok(());
        }
        self.write(|entries| {
            entries.remove(key);
        })
        .await
    }
}

/// Non-persistent preference store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreferenceStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
