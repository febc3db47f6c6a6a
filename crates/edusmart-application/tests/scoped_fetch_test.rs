//! Scoped reads following the academic context.

mod common;

use common::{MockBackend, resolver, session, wait_for_state, years};
use edusmart_application::{FetchOptions, ScopedFetcher};
use edusmart_core::session::Role;
use edusmart_infrastructure::InMemoryPreferenceStore;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Echo {
    endpoint: String,
    campus_id: String,
    academic_year_id: String,
}

async fn ready_resolver(
    backend: Arc<MockBackend>,
    campus_ids: &[&str],
) -> Arc<edusmart_application::AcademicContextResolver> {
    let resolver = resolver(backend, Arc::new(InMemoryPreferenceStore::new()));
    resolver
        .initialize(Some(session(Role::Admin, campus_ids)))
        .await
        .unwrap();
    resolver
}

#[tokio::test]
async fn test_fetch_appends_active_scope() {
    let backend = MockBackend::with_years(years(&[("y1", false), ("y2", true)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/students");
    let mut states = handle.subscribe();
    let state = wait_for_state(&mut states, |s| s.data.is_some()).await;

    assert_eq!(
        state.data.unwrap(),
        Echo {
            endpoint: "/students".into(),
            campus_id: "c1".into(),
            academic_year_id: "y2".into(),
        }
    );
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_no_request_without_active_campus() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    let resolver = ready_resolver(backend.clone(), &[]).await;
    assert!(resolver.snapshot().context.active_campus().is_none());
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Value>("/students");
    handle.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(backend.reads().is_empty());
    let state = handle.state();
    assert!(state.data.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_scope_change_refetches_and_discards_old_scope() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    *backend.slow_campus.lock().unwrap() = Some("c1".into());
    let resolver = ready_resolver(backend.clone(), &["c1", "c2"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/finance/reports");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.loading).await;

    // c1 is still answering when the user switches
    resolver.change_campus("c2").await.unwrap();
    let state = wait_for_state(&mut states, |s| s.data.is_some()).await;
    assert_eq!(state.data.unwrap().campus_id, "c2");

    // Well past the slow c1 response
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(handle.data().unwrap().campus_id, "c2");
    let campuses: Vec<String> = backend.reads().into_iter().map(|(_, c, _)| c).collect();
    assert_eq!(campuses.last().map(String::as_str), Some("c2"));
    assert_eq!(campuses.iter().filter(|c| c.as_str() == "c2").count(), 1);
}

#[tokio::test]
async fn test_year_change_refetches() {
    let backend = MockBackend::with_years(years(&[("y1", true), ("y2", false)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/students");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.data.is_some()).await;

    resolver.change_year("y2").await.unwrap();
    let state = wait_for_state(&mut states, |s| {
        s.data.as_ref().is_some_and(|d| d.academic_year_id == "y2")
    })
    .await;
    assert!(!state.loading);
}

#[tokio::test]
async fn test_failure_keeps_previous_data() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/students");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.data.is_some()).await;

    backend.fail_reads.store(true, Ordering::SeqCst);
    handle.refetch();
    let state = wait_for_state(&mut states, |s| s.error.is_some()).await;

    assert_eq!(state.error.unwrap().user_message(), "Database unavailable");
    assert_eq!(state.data.unwrap().campus_id, "c1");
    assert!(!state.loading);

    backend.fail_reads.store(false, Ordering::SeqCst);
    handle.refetch();
    let state = wait_for_state(&mut states, |s| s.error.is_none() && !s.loading).await;
    assert!(state.data.is_some());
}

#[tokio::test]
async fn test_decode_failure_surfaces_as_error() {
    #[derive(Debug, Clone, Deserialize)]
    #[allow(dead_code)]
    struct Student {
        roll: u32,
    }

    let backend = MockBackend::with_years(years(&[("y1", true)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Vec<Student>>("/students");
    let mut states = handle.subscribe();
    let state = wait_for_state(&mut states, |s| s.error.is_some()).await;

    assert!(matches!(
        state.error.unwrap(),
        edusmart_core::EduError::Serialization { .. }
    ));
}

#[tokio::test]
async fn test_manual_fetch_waits_for_refetch() {
    let backend = MockBackend::with_years(years(&[("y1", true), ("y2", false)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch_with::<Echo>("/exams/marks", FetchOptions::manual());
    resolver.change_year("y2").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(backend.reads().is_empty());

    handle.refetch();
    let mut states = handle.subscribe();
    let state = wait_for_state(&mut states, |s| s.data.is_some()).await;
    assert_eq!(state.data.unwrap().academic_year_id, "y2");
    assert_eq!(backend.reads().len(), 1);
}

#[tokio::test]
async fn test_endpoint_change_refetches() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/students?section=A");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.data.is_some()).await;

    handle.set_endpoint("/students?section=B");
    let state = wait_for_state(&mut states, |s| {
        s.data.as_ref().is_some_and(|d| d.endpoint == "/students?section=B")
    })
    .await;
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_dropped_handle_stops_following() {
    let backend = MockBackend::with_years(years(&[("y1", true), ("y2", false)]));
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, CancellationToken::new());

    let handle = fetcher.fetch::<Echo>("/students");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.data.is_some()).await;
    drop(handle);

    resolver.change_year("y2").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.reads().len(), 1);
}

#[tokio::test]
async fn test_session_cancellation_abandons_in_flight_read() {
    let backend = MockBackend::with_years(years(&[("y1", true)]));
    *backend.slow_campus.lock().unwrap() = Some("c1".into());
    let resolver = ready_resolver(backend.clone(), &["c1"]).await;
    let session_token = CancellationToken::new();
    let fetcher = ScopedFetcher::new(backend.clone(), &resolver, session_token.clone());

    let handle = fetcher.fetch::<Echo>("/students");
    let mut states = handle.subscribe();
    wait_for_state(&mut states, |s| s.loading).await;

    session_token.cancel();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(handle.is_stopped());
    assert!(handle.data().is_none());
}
