//! Composition root: wires adapters into the application services.

use crate::academic_context::AcademicContextResolver;
use crate::context_binding::ContextBinding;
use crate::notification::Notifier;
use crate::scoped_fetch::ScopedFetcher;
use crate::session_store::SessionStore;
use crate::year_admin::AcademicYearAdmin;
use edusmart_core::access::RouteGuard;
use edusmart_core::config::ClientConfig;
use edusmart_core::error::Result;
use edusmart_core::preference::PreferenceStore;
use edusmart_core::session::CredentialRepository;
use edusmart_infrastructure::{
    InMemoryCredentialStore, InMemoryPreferenceStore, JsonCredentialStore, TomlPreferenceStore,
};
use edusmart_interaction::RestClient;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Keep the session and preferences on disk. Falls back to memory when
    /// the config directory is unavailable.
    pub persistent: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { persistent: true }
    }
}

/// Every service of a running client.
pub struct AppServices {
    pub config: ClientConfig,
    pub client: Arc<RestClient>,
    pub sessions: Arc<SessionStore>,
    pub resolver: Arc<AcademicContextResolver>,
    pub year_admin: AcademicYearAdmin,
    pub guard: RouteGuard,
    binding: ContextBinding,
}

impl AppServices {
    /// Builds the services, restores the session and starts context
    /// resolution. Session restoration completes before the resolver runs.
    pub async fn bootstrap(
        config: ClientConfig,
        options: BootstrapOptions,
        notifier: Notifier,
    ) -> Result<Self> {
        tracing::info!("[Bootstrap] API base URL: {}", config.api_base_url);
        let client = Arc::new(RestClient::new(&config)?);

        let (credentials, preferences) = if options.persistent {
            (durable_credentials(), durable_preferences().await)
        } else {
            tracing::info!("[Bootstrap] Running without persistence");
            (
                Arc::new(InMemoryCredentialStore::new()) as Arc<dyn CredentialRepository>,
                Arc::new(InMemoryPreferenceStore::new()) as Arc<dyn PreferenceStore>,
            )
        };

        let sessions = Arc::new(SessionStore::new(
            client.clone(),
            credentials,
            notifier.clone(),
        ));
        if let Err(e) = sessions.initialize().await {
            tracing::warn!("[Bootstrap] Continuing signed out: {}", e);
        }

        let resolver = Arc::new(AcademicContextResolver::new(
            client.clone(),
            preferences,
            notifier.clone(),
        ));
        let binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
        let year_admin = AcademicYearAdmin::new(client.clone(), resolver.clone(), notifier);

        tracing::info!("[Bootstrap] Services ready");
        Ok(Self {
            config,
            client,
            sessions,
            resolver,
            year_admin,
            guard: RouteGuard::default(),
            binding,
        })
    }

    /// A fetcher bound to the current session.
    pub fn fetcher(&self) -> ScopedFetcher {
        ScopedFetcher::new(
            self.client.clone(),
            &self.resolver,
            self.sessions.session_token(),
        )
    }

    pub async fn shutdown(self) {
        self.binding.shutdown().await;
    }
}

fn durable_credentials() -> Arc<dyn CredentialRepository> {
    match JsonCredentialStore::new() {
        Ok(store) => {
            tracing::debug!("[Bootstrap] Session file: {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("[Bootstrap] Session will not persist: {}", e);
            Arc::new(InMemoryCredentialStore::new())
        }
    }
}

async fn durable_preferences() -> Arc<dyn PreferenceStore> {
    match TomlPreferenceStore::new().await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("[Bootstrap] Preferences will not persist: {}", e);
            Arc::new(InMemoryPreferenceStore::new())
        }
    }
}
