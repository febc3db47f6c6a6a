//! Shared test doubles for the application services.
#![allow(dead_code)]

use edusmart_application::{AcademicContextResolver, FetchState, Notifier};
use edusmart_core::academic::{AcademicApi, AcademicYear, Campus};
use edusmart_core::error::{EduError, Result};
use edusmart_core::preference::PreferenceStore;
use edusmart_core::resource::ResourceReader;
use edusmart_core::session::{Role, Session};
use edusmart_infrastructure::InMemoryPreferenceStore;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// In-memory backend that records every call.
#[derive(Default)]
pub struct MockBackend {
    pub years: Mutex<Vec<AcademicYear>>,
    pub campuses: Mutex<Vec<Campus>>,
    /// Endpoints hit by the resolver, in order
    pub calls: Mutex<Vec<String>>,
    /// Scoped reads as (endpoint, campusId, academicYearId)
    pub reads: Mutex<Vec<(String, String, String)>>,
    pub fail_lists: AtomicBool,
    pub fail_reads: AtomicBool,
    pub reject_credential: AtomicBool,
    /// Reads for this campus take a while to answer
    pub slow_campus: Mutex<Option<String>>,
    /// The year list takes a while to answer
    pub slow_years: AtomicBool,
}

impl MockBackend {
    pub fn with_years(years: Vec<AcademicYear>) -> Arc<Self> {
        let backend = Self::default();
        *backend.years.lock().unwrap() = years;
        Arc::new(backend)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<(String, String, String)> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AcademicApi for MockBackend {
    async fn list_years(&self) -> Result<Vec<AcademicYear>> {
        self.calls.lock().unwrap().push("/academics/years".into());
        if self.slow_years.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if self.reject_credential.load(Ordering::SeqCst) {
            return Err(EduError::Unauthenticated);
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(EduError::Network("connection refused".into()));
        }
        Ok(self.years.lock().unwrap().clone())
    }

    async fn list_campuses(&self) -> Result<Vec<Campus>> {
        self.calls.lock().unwrap().push("/campuses".into());
        Ok(self.campuses.lock().unwrap().clone())
    }
}

#[async_trait::async_trait]
impl ResourceReader for MockBackend {
    async fn get_json(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<Value> {
        let param = |name: &str| {
            query
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        let campus = param("campusId");
        let year = param("academicYearId");
        self.reads
            .lock()
            .unwrap()
            .push((endpoint.to_string(), campus.clone(), year.clone()));

        let slow = self.slow_campus.lock().unwrap().as_deref() == Some(campus.as_str());
        if slow {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(EduError::http(500, "Database unavailable"));
        }
        Ok(json!({ "endpoint": endpoint, "campusId": campus, "academicYearId": year }))
    }
}

/// Preference store that counts writes.
#[derive(Default)]
pub struct CountingPreferences {
    inner: InMemoryPreferenceStore,
    writes: AtomicUsize,
}

impl CountingPreferences {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PreferenceStore for CountingPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}

pub fn years(entries: &[(&str, bool)]) -> Vec<AcademicYear> {
    entries
        .iter()
        .map(|(id, current)| AcademicYear::new(*id, format!("Session {id}"), *current))
        .collect()
}

pub fn campuses(ids: &[&str]) -> Vec<Campus> {
    ids.iter()
        .map(|id| Campus::new(*id, format!("Campus {id}")))
        .collect()
}

pub fn session(role: Role, campus_ids: &[&str]) -> Session {
    Session {
        id: "u1".into(),
        name: "Test User".into(),
        email: Some("user@school.com".into()),
        role,
        token: "jwt".into(),
        campuses: campuses(campus_ids),
    }
}

pub fn resolver(
    backend: Arc<MockBackend>,
    preferences: Arc<dyn PreferenceStore>,
) -> Arc<AcademicContextResolver> {
    Arc::new(AcademicContextResolver::new(
        backend,
        preferences,
        Notifier::silent(),
    ))
}

/// Waits (bounded) until the fetch state satisfies `predicate`.
pub async fn wait_for_state<T, F>(receiver: &mut watch::Receiver<FetchState<T>>, predicate: F) -> FetchState<T>
where
    T: Clone,
    F: FnMut(&FetchState<T>) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for fetch state")
        .expect("fetch state channel closed")
        .clone()
}
