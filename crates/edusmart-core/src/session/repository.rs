//! Session ports.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::model::{Credentials, Session};

/// Durable storage for the signed-in session (token plus user payload).
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Returns the persisted session, if any.
    async fn load(&self) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;

    /// Removes the persisted session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Authentication endpoints of the backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<Session>;

    /// Attaches (or detaches, with `None`) the bearer token used for every
    /// subsequent request.
    fn set_bearer_token(&self, token: Option<String>);
}
