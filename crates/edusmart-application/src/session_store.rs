use crate::notification::Notifier;
use edusmart_core::error::{EduError, Result};
use edusmart_core::session::{AuthApi, CredentialRepository, Credentials, Session, SessionPhase};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const WELCOME: &str = "Welcome to EduSmart ERP";

/// Owns the signed-in session.
///
/// `SessionStore` is responsible for:
/// - Restoring the persisted credential on startup
/// - Logging in and out against the backend
/// - Attaching the bearer token to the HTTP adapter
/// - Publishing the [`SessionPhase`] to subscribers
/// - Handing out a cancellation token that lives as long as one session
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialRepository>,
    notifier: Notifier,
    phase: watch::Sender<SessionPhase>,
    session_token: Mutex<CancellationToken>,
}

impl SessionStore {
    /// Creates a store in the `Checking` phase.
    ///
    /// # Arguments
    ///
    /// * `auth` - Backend authentication port (also carries the bearer token)
    /// * `credentials` - Durable storage for the session payload
    /// * `notifier` - Sink for user-visible messages
    pub fn new(
        auth: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialRepository>,
        notifier: Notifier,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Checking);
        Self {
            auth,
            credentials,
            notifier,
            phase,
            session_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Reads the persisted credential and settles the phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be read; the phase is
    /// still settled to `SignedOut` in that case.
    pub async fn initialize(&self) -> Result<SessionPhase> {
        match self.credentials.load().await {
            Ok(Some(session)) => {
                tracing::info!(
                    "[SessionStore] Restored session for {} ({})",
                    session.name,
                    session.role
                );
                self.begin(session.clone());
                Ok(SessionPhase::SignedIn(session))
            }
            Ok(None) => {
                tracing::debug!("[SessionStore] No persisted session");
                self.phase.send_replace(SessionPhase::SignedOut);
                Ok(SessionPhase::SignedOut)
            }
            Err(e) => {
                tracing::error!("[SessionStore] Failed to read persisted session: {}", e);
                self.phase.send_replace(SessionPhase::SignedOut);
                Err(e)
            }
        }
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// A failed login never leaves a session behind; a previous session (if
    /// any) is kept.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        tracing::debug!("[SessionStore] Logging in as {}", credentials.email);

        let session = match self.auth.login(credentials).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[SessionStore] Login failed: {}", e);
                let message = match &e {
                    EduError::Http { message, .. } if !message.is_empty() => message.clone(),
                    _ => LOGIN_FAILED.to_string(),
                };
                self.notifier.error(message);
                if !matches!(*self.phase.borrow(), SessionPhase::SignedIn(_)) {
                    self.phase.send_replace(SessionPhase::SignedOut);
                }
                return Err(e);
            }
        };

        if let Err(e) = self.credentials.save(&session).await {
            // The session is usable; it just won't survive a restart
            tracing::warn!("[SessionStore] Failed to persist session: {}", e);
        }

        tracing::info!(
            "[SessionStore] Signed in {} ({})",
            session.name,
            session.role
        );
        self.begin(session.clone());
        self.notifier.success(WELCOME);
        Ok(session)
    }

    /// Ends the session: clears the stored credential, detaches the token and
    /// cancels every task tied to the session.
    pub async fn logout(&self) {
        if let Err(e) = self.credentials.clear().await {
            tracing::warn!("[SessionStore] Failed to clear persisted session: {}", e);
        }
        self.auth.set_bearer_token(None);
        self.lock_token().cancel();
        self.phase.send_replace(SessionPhase::SignedOut);
        tracing::info!("[SessionStore] Signed out");
    }

    /// Logs out after the backend rejected the credential.
    pub async fn invalidate(&self) {
        if self.current().is_none() {
            return;
        }
        tracing::warn!("[SessionStore] Credential rejected by server");
        self.notifier.error(EduError::Unauthenticated.user_message());
        self.logout().await;
    }

    pub fn current(&self) -> Option<Session> {
        self.phase.borrow().session().cloned()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Token cancelled when the current session ends.
    pub fn session_token(&self) -> CancellationToken {
        self.lock_token().clone()
    }

    fn begin(&self, session: Session) {
        self.auth.set_bearer_token(Some(session.token.clone()));
        {
            let mut token = self.lock_token();
            token.cancel();
            *token = CancellationToken::new();
        }
        self.phase.send_replace(SessionPhase::SignedIn(session));
    }

    fn lock_token(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.session_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
