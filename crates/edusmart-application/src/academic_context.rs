//! Academic context resolution.
//!
//! [`AcademicContextResolver`] is the single writer of the active campus and
//! year. Readers observe it through a `watch` channel of [`ContextSnapshot`]s;
//! every published change carries a new revision.

use crate::notification::Notifier;
use edusmart_core::academic::selection::{select_campus, select_year};
use edusmart_core::academic::{AcademicApi, AcademicContext, AcademicYear, Campus, ContextScope};
use edusmart_core::error::{EduError, Result};
use edusmart_core::preference::{PreferenceKey, PreferenceStore};
use edusmart_core::session::Session;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

const SYNC_FAILED: &str = "Failed to sync academic session";

/// Lifecycle of the published context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContextStatus {
    /// No session, nothing resolved.
    #[default]
    Empty,
    Loading,
    Ready,
    /// The last resolution failed; the context is empty.
    Failed(EduError),
}

/// What readers of the resolver see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextSnapshot {
    pub context: AcademicContext,
    pub status: ContextStatus,
    /// Incremented on every publish.
    pub revision: u64,
}

impl ContextSnapshot {
    pub fn scope(&self) -> Option<ContextScope> {
        self.context.scope()
    }

    pub fn is_loading(&self) -> bool {
        self.status == ContextStatus::Loading
    }
}

/// Fetched lists plus the stored preferences they are resolved against.
struct ResolvedInputs {
    years: Vec<AcademicYear>,
    campuses: Vec<Campus>,
    preferred_year: Option<String>,
    preferred_campus: Option<String>,
}

#[derive(Default)]
struct ResolverState {
    session: Option<Session>,
    /// Bumped by every initialize/refresh; older runs are discarded.
    generation: u64,
    campus_seq: u64,
    year_seq: u64,
}

impl ResolverState {
    fn seq(&self, key: PreferenceKey) -> u64 {
        match key {
            PreferenceKey::PreferredCampus => self.campus_seq,
            PreferenceKey::PreferredYear => self.year_seq,
        }
    }

    fn next_seq(&mut self, key: PreferenceKey) -> u64 {
        let seq = match key {
            PreferenceKey::PreferredCampus => &mut self.campus_seq,
            PreferenceKey::PreferredYear => &mut self.year_seq,
        };
        *seq += 1;
        *seq
    }
}

/// Resolves and owns the active campus and academic year.
pub struct AcademicContextResolver {
    api: Arc<dyn AcademicApi>,
    preferences: Arc<dyn PreferenceStore>,
    notifier: Notifier,
    snapshot: watch::Sender<ContextSnapshot>,
    state: Mutex<ResolverState>,
    /// Serializes preference writes so a superseded change never lands last.
    persist_lock: Mutex<()>,
}

impl AcademicContextResolver {
    pub fn new(
        api: Arc<dyn AcademicApi>,
        preferences: Arc<dyn PreferenceStore>,
        notifier: Notifier,
    ) -> Self {
        let (snapshot, _) = watch::channel(ContextSnapshot::default());
        Self {
            api,
            preferences,
            notifier,
            snapshot,
            state: Mutex::new(ResolverState::default()),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn scope(&self) -> Option<ContextScope> {
        self.snapshot.borrow().scope()
    }

    /// Waits until the first resolution has finished (successfully or not).
    pub async fn settled(&self) -> Result<ContextSnapshot> {
        let mut receiver = self.subscribe();
        let snapshot = receiver
            .wait_for(|s| s.revision > 0 && !s.is_loading())
            .await
            .map_err(|e| EduError::internal(format!("Context channel closed: {}", e)))?;
        Ok(snapshot.clone())
    }

    /// Resolves the context for `session`.
    ///
    /// Without a session the context is reset to empty and no request is
    /// made. With a session, years (and, for the top-level role, the global
    /// campus list) are fetched and the active values are picked by the
    /// selection precedence.
    ///
    /// # Errors
    ///
    /// `EduError::Unauthenticated` if the backend rejected the credential,
    /// `EduError::ContextResolution` for any other fetch failure. Either way
    /// the published context is empty with a `Failed` status.
    pub async fn initialize(&self, session: Option<Session>) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.session = session.clone();
            let generation = state.generation;

            match &session {
                None => {
                    self.publish(AcademicContext::empty(), ContextStatus::Empty);
                    tracing::debug!("[Resolver] Reset to empty context");
                    return Ok(());
                }
                Some(_) => self.publish(AcademicContext::empty(), ContextStatus::Loading),
            }
            generation
        };

        match session {
            Some(session) => self.resolve(generation, &session, false).await,
            None => Ok(()),
        }
    }

    /// Re-runs resolution for the current session, keeping the active
    /// campus/year when they are still available.
    ///
    /// # Errors
    ///
    /// Same as [`initialize`](Self::initialize), except that the context
    /// published before the refresh stays in place (with a `Failed` status).
    pub async fn refresh(&self) -> Result<()> {
        let (generation, session) = {
            let mut state = self.state.lock().await;
            let Some(session) = state.session.clone() else {
                tracing::debug!("[Resolver] Refresh without session ignored");
                return Ok(());
            };
            state.generation += 1;
            let current = self.snapshot.borrow().context.clone();
            self.publish(current, ContextStatus::Loading);
            (state.generation, session)
        };

        self.resolve(generation, &session, true).await
    }

    async fn resolve(&self, generation: u64, session: &Session, retain: bool) -> Result<()> {
        let fetched = self.fetch_inputs(session).await;

        let state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(
                "[Resolver] Discarding superseded resolution (generation {} < {})",
                generation,
                state.generation
            );
            return Ok(());
        }

        let inputs = match fetched {
            Ok(inputs) => inputs,
            Err(e) => {
                let error = if e.is_unauthenticated() {
                    e
                } else {
                    EduError::context_resolution(e.to_string())
                };
                tracing::error!("[Resolver] Context resolution failed: {}", error);
                // A failed refresh keeps the selection that was working
                let context = if retain {
                    self.snapshot.borrow().context.clone()
                } else {
                    AcademicContext::empty()
                };
                self.publish(context, ContextStatus::Failed(error.clone()));
                self.notifier.error(SYNC_FAILED);
                return Err(error);
            }
        };

        // Read at publish time so changes made while loading are kept
        let (retained_campus, retained_year) = if retain {
            let current = self.snapshot.borrow();
            (
                current.context.active_campus().map(|c| c.id.clone()),
                current.context.active_year().map(|y| y.id.clone()),
            )
        } else {
            (None, None)
        };

        let year_id = select_year(
            &inputs.years,
            retained_year.as_deref(),
            inputs.preferred_year.as_deref(),
        )
        .map(|y| y.id.clone());
        let campus_id = select_campus(
            &inputs.campuses,
            retained_campus.as_deref(),
            inputs.preferred_campus.as_deref(),
        )
        .map(|c| c.id.clone());

        let context = AcademicContext::resolved(
            inputs.campuses,
            inputs.years,
            campus_id.as_deref(),
            year_id.as_deref(),
        );
        tracing::info!(
            "[Resolver] Context ready: campus={:?} year={:?} ({} campuses, {} years)",
            context.active_campus().map(|c| &c.name),
            context.active_year().map(|y| &y.label),
            context.available_campuses().len(),
            context.available_years().len()
        );
        self.publish(context, ContextStatus::Ready);
        drop(state);
        Ok(())
    }

    async fn fetch_inputs(&self, session: &Session) -> Result<ResolvedInputs> {
        let years = self.api.list_years().await?;

        let campuses = if session.role.is_top_level() {
            self.api.list_campuses().await?
        } else {
            session.campuses.clone()
        };

        Ok(ResolvedInputs {
            years,
            campuses,
            preferred_year: self
                .read_preference(PreferenceKey::PreferredYear, &session.id)
                .await,
            preferred_campus: self
                .read_preference(PreferenceKey::PreferredCampus, &session.id)
                .await,
        })
    }

    async fn read_preference(&self, key: PreferenceKey, user_id: &str) -> Option<String> {
        match self.preferences.get(&key.for_user(user_id)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[Resolver] Ignoring unreadable preference {}: {}", key, e);
                None
            }
        }
    }

    /// Activates `campus_id` and stores it as the user's preference.
    ///
    /// # Errors
    ///
    /// `EduError::Validation` if the campus is not available; nothing is
    /// changed or written in that case.
    pub async fn change_campus(&self, campus_id: &str) -> Result<()> {
        let Some((seq, key, name)) = self
            .apply_change(PreferenceKey::PreferredCampus, campus_id)
            .await?
        else {
            return Ok(());
        };
        self.notifier.success(format!("Switched to {}", name));
        self.persist(PreferenceKey::PreferredCampus, seq, key, campus_id)
            .await
    }

    /// Activates `year_id` and stores it as the user's preference.
    ///
    /// # Errors
    ///
    /// `EduError::Validation` if the year is not available.
    pub async fn change_year(&self, year_id: &str) -> Result<()> {
        let Some((seq, key, label)) = self
            .apply_change(PreferenceKey::PreferredYear, year_id)
            .await?
        else {
            return Ok(());
        };
        self.notifier.success(format!("Session set to {}", label));
        self.persist(PreferenceKey::PreferredYear, seq, key, year_id)
            .await
    }

    /// Validates and applies a change in memory.
    ///
    /// Returns `None` for a no-op (already active and already stored),
    /// otherwise the change's sequence number, the storage key and the
    /// display name of the new selection.
    async fn apply_change(
        &self,
        field: PreferenceKey,
        id: &str,
    ) -> Result<Option<(u64, Option<String>, String)>> {
        let mut state = self.state.lock().await;
        let mut context = self.snapshot.borrow().context.clone();

        let (display, already_active) = match field {
            PreferenceKey::PreferredCampus => (
                context.campus(id).map(|c| c.name.clone()),
                context.active_campus().is_some_and(|c| c.id == id),
            ),
            PreferenceKey::PreferredYear => (
                context.year(id).map(|y| y.label.clone()),
                context.active_year().is_some_and(|y| y.id == id),
            ),
        };

        let Some(display) = display else {
            let entity = match field {
                PreferenceKey::PreferredCampus => "Campus",
                PreferenceKey::PreferredYear => "AcademicYear",
            };
            let error = EduError::invalid_selection(entity, id);
            tracing::warn!("[Resolver] Rejected change: {}", error);
            self.notifier.error(error.to_string());
            return Err(error);
        };

        let key = state.session.as_ref().map(|s| field.for_user(&s.id));

        if already_active {
            let stored = match &key {
                Some(key) => self.preferences.get(key).await.ok().flatten(),
                None => None,
            };
            if stored.as_deref() == Some(id) {
                tracing::debug!("[Resolver] {} already {}; nothing to do", field, id);
                return Ok(None);
            }
        } else {
            let selected = match field {
                PreferenceKey::PreferredCampus => context.select_campus(id),
                PreferenceKey::PreferredYear => context.select_year(id),
            };
            debug_assert!(selected);
            let status = self.snapshot.borrow().status.clone();
            self.publish(context, status);
            tracing::info!("[Resolver] {} changed to {}", field, id);
        }

        let seq = state.next_seq(field);
        Ok(Some((seq, key, display)))
    }

    /// Writes a preference unless a later change to the same field exists.
    async fn persist(
        &self,
        field: PreferenceKey,
        seq: u64,
        key: Option<String>,
        value: &str,
    ) -> Result<()> {
        let Some(key) = key else {
            return Ok(());
        };

        let _write = self.persist_lock.lock().await;
        if self.state.lock().await.seq(field) != seq {
            tracing::debug!("[Resolver] Skipping superseded {} write ({})", field, value);
            return Ok(());
        }

        self.preferences
            .set(&key, value.to_string())
            .await
            .inspect_err(|e| {
                tracing::error!("[Resolver] Failed to store {}: {}", field, e);
            })
    }

    fn publish(&self, context: AcademicContext, status: ContextStatus) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.context = context;
            snapshot.status = status;
            snapshot.revision += 1;
        });
    }
}
