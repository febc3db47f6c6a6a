//! Session lifecycle driving the academic context.

mod common;

use common::{MockBackend, resolver, session, years};
use edusmart_application::{
    ContextBinding, ContextSnapshot, ContextStatus, Notifier, NotificationLevel, ScopedFetcher,
    SessionStore,
};
use edusmart_core::access::{GuardDecision, RouteGuard};
use edusmart_core::error::{EduError, Result};
use edusmart_core::session::{AuthApi, Credentials, Role, Session, SessionPhase};
use edusmart_infrastructure::{InMemoryCredentialStore, InMemoryPreferenceStore};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

struct StubAuth {
    session: Session,
    token: Mutex<Option<String>>,
}

#[async_trait::async_trait]
impl AuthApi for StubAuth {
    async fn login(&self, _credentials: &Credentials) -> Result<Session> {
        Ok(self.session.clone())
    }

    fn set_bearer_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }
}

fn stub_auth(role: Role, campus_ids: &[&str]) -> Arc<StubAuth> {
    Arc::new(StubAuth {
        session: session(role, campus_ids),
        token: Mutex::new(None),
    })
}

async fn wait_for_context<F>(receiver: &mut watch::Receiver<ContextSnapshot>, predicate: F) -> ContextSnapshot
where
    F: FnMut(&ContextSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for context")
        .expect("context channel closed")
        .clone()
}

#[tokio::test]
async fn test_context_follows_login_and_logout() {
    let backend = MockBackend::with_years(years(&[("y1", false), ("y2", true)]));
    let auth = stub_auth(Role::Admin, &["c1", "c2"]);
    let sessions = Arc::new(SessionStore::new(
        auth.clone(),
        Arc::new(InMemoryCredentialStore::new()),
        Notifier::silent(),
    ));
    let resolver = resolver(backend.clone(), Arc::new(InMemoryPreferenceStore::new()));
    sessions.initialize().await.unwrap();
    let binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
    let mut contexts = resolver.subscribe();

    let signed_out = wait_for_context(&mut contexts, |s| s.revision > 0).await;
    assert_eq!(signed_out.status, ContextStatus::Empty);
    assert!(backend.calls().is_empty());

    sessions
        .login(&Credentials::new("admin@school.com", "pw"))
        .await
        .unwrap();
    let ready = wait_for_context(&mut contexts, |s| s.status == ContextStatus::Ready).await;
    assert_eq!(ready.context.active_campus().unwrap().id, "c1");
    assert_eq!(ready.context.active_year().unwrap().id, "y2");

    sessions.logout().await;
    let reset = wait_for_context(&mut contexts, |s| s.status == ContextStatus::Empty).await;
    assert!(reset.context.is_empty());
    assert!(reset.scope().is_none());

    binding.shutdown().await;
}

#[tokio::test]
async fn test_restored_session_resolves_before_first_fetch() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    let credentials = Arc::new(InMemoryCredentialStore::with_session(session(
        Role::Teacher,
        &["c1"],
    )));
    let sessions = Arc::new(SessionStore::new(
        stub_auth(Role::Teacher, &["c1"]),
        credentials,
        Notifier::silent(),
    ));
    let resolver = resolver(backend.clone(), Arc::new(InMemoryPreferenceStore::new()));

    // While the session is being checked, the guard holds navigation back
    let guard = RouteGuard::default();
    assert_eq!(guard.check(&sessions.phase(), "/attendance"), GuardDecision::Checking);

    sessions.initialize().await.unwrap();
    let _binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
    let snapshot = resolver.settled().await.unwrap();

    assert_eq!(guard.check(&sessions.phase(), "/attendance"), GuardDecision::Allow);
    assert_eq!(snapshot.status, ContextStatus::Ready);
    assert_eq!(backend.calls(), vec!["/academics/years".to_string()]);
}

#[tokio::test]
async fn test_rejected_credential_signs_out() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    backend.reject_credential.store(true, Ordering::SeqCst);
    let (notifier, mut notifications) = Notifier::channel();
    let sessions = Arc::new(SessionStore::new(
        stub_auth(Role::Admin, &["c1"]),
        Arc::new(InMemoryCredentialStore::with_session(session(Role::Admin, &["c1"]))),
        notifier,
    ));
    let resolver = resolver(backend.clone(), Arc::new(InMemoryPreferenceStore::new()));
    sessions.initialize().await.unwrap();
    let mut phases = sessions.subscribe();

    let _binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
    tokio::time::timeout(
        Duration::from_secs(2),
        phases.wait_for(|p| *p == SessionPhase::SignedOut),
    )
    .await
    .unwrap()
    .unwrap();

    let guard = RouteGuard::default();
    assert_eq!(
        guard.check(&sessions.phase(), "/students"),
        GuardDecision::RedirectToLogin {
            from: "/students".into()
        }
    );

    let mut messages = Vec::new();
    while let Ok(notification) = notifications.try_recv() {
        assert_eq!(notification.level, NotificationLevel::Error);
        messages.push(notification.message);
    }
    assert!(messages.contains(&EduError::Unauthenticated.user_message()));
}

#[tokio::test]
async fn test_logout_stops_session_fetchers() {
    let backend = MockBackend::with_years(years(&[("y1", true), ("y2", false)]));
    let sessions = Arc::new(SessionStore::new(
        stub_auth(Role::Admin, &["c1"]),
        Arc::new(InMemoryCredentialStore::new()),
        Notifier::silent(),
    ));
    let resolver = resolver(backend.clone(), Arc::new(InMemoryPreferenceStore::new()));
    sessions.initialize().await.unwrap();
    let _binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
    sessions.login(&Credentials::new("a@b.c", "pw")).await.unwrap();
    let mut contexts = resolver.subscribe();
    wait_for_context(&mut contexts, |s| s.status == ContextStatus::Ready).await;

    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, sessions.session_token());
    let handle = fetcher.fetch::<Value>("/students");
    let mut states = handle.subscribe();
    common::wait_for_state(&mut states, |s| s.data.is_some()).await;

    sessions.logout().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(handle.is_stopped());
    assert_eq!(backend.reads().len(), 1);
}

#[tokio::test]
async fn test_logout_during_resolution_leaves_context_empty() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    backend.slow_years.store(true, Ordering::SeqCst);
    let sessions = Arc::new(SessionStore::new(
        stub_auth(Role::Admin, &["c1"]),
        Arc::new(InMemoryCredentialStore::new()),
        Notifier::silent(),
    ));
    let resolver = resolver(backend.clone(), Arc::new(InMemoryPreferenceStore::new()));
    sessions.initialize().await.unwrap();
    let binding = ContextBinding::spawn(sessions.clone(), resolver.clone());
    let mut contexts = resolver.subscribe();

    sessions.login(&Credentials::new("a@b.c", "pw")).await.unwrap();
    wait_for_context(&mut contexts, |s| s.is_loading()).await;

    sessions.logout().await;
    wait_for_context(&mut contexts, |s| s.status == ContextStatus::Empty).await;

    // Well past the slow year list
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snapshot = resolver.snapshot();
    assert_eq!(snapshot.status, ContextStatus::Empty);
    assert!(snapshot.context.is_empty());

    binding.shutdown().await;
}
