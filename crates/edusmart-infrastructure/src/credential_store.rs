//! Session credential persistence.
//!
//! The login payload (user plus bearer token) is stored as JSON so the
//! session survives restarts, the same way the browser kept it in local
//! storage.

use crate::paths::EduPaths;
use edusmart_core::error::{EduError, Result};
use edusmart_core::session::{CredentialRepository, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Stores the session in `session.json`.
///
/// Does NOT validate the token; an expired token is detected by the first
/// request that the backend rejects.
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    /// Creates a store at the default path (`~/.config/edusmart/session.json`).
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(EduPaths::session_file()?))
    }

    /// Creates a store with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Sibling file the session is written to before it replaces `path`.
    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| EduError::io(format!("Invalid session path: {}", self.path.display())))?;
        Ok(self
            .path
            .with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[async_trait::async_trait]
impl CredentialRepository for JsonCredentialStore {
    async fn load(&self) -> Result<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable credential is treated as signed out
                tracing::warn!(
                    "[CredentialStore] Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session)?;

        // A leftover temp file may carry other permissions; start fresh
        let tmp_path = self.temp_path()?;
        match tokio::fs::remove_file(&tmp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EduError::from(e)),
        }
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if a previous run had signed in.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }
}

#[async_trait::async_trait]
impl CredentialRepository for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}
