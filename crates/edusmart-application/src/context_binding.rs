//! Keeps the resolver in step with the session.

use crate::academic_context::AcademicContextResolver;
use crate::session_store::SessionStore;
use edusmart_core::error::Result;
use edusmart_core::session::SessionPhase;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type Resolution = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Background task that re-initializes the resolver on every session change.
///
/// Nothing is resolved while the session is still `Checking`. A sign-out
/// resets the context to empty, and a resolution still running when the
/// session changes again is dropped. A credential rejected during
/// resolution invalidates the session.
pub struct ContextBinding {
    stop: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ContextBinding {
    pub fn spawn(sessions: Arc<SessionStore>, resolver: Arc<AcademicContextResolver>) -> Self {
        let stop = CancellationToken::new();
        let task = tokio::spawn(run(sessions, resolver, stop.clone()));
        Self {
            stop,
            task: Some(task),
        }
    }

    /// Stops following the session and waits for the task to exit.
    pub async fn shutdown(mut self) {
        self.stop.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ContextBinding {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn run(
    sessions: Arc<SessionStore>,
    resolver: Arc<AcademicContextResolver>,
    stop: CancellationToken,
) {
    let mut phases = sessions.subscribe();
    let initial = phases.borrow_and_update().clone();
    let mut resolution = start(&resolver, initial);

    loop {
        tokio::select! {
            biased;

            _ = stop.cancelled() => break,

            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = phases.borrow_and_update().clone();
                tracing::debug!("[ContextBinding] Session phase changed: {}", describe(&phase));
                // Replacing the future drops any resolution still running
                resolution = start(&resolver, phase);
            }

            result = wait(&mut resolution) => {
                resolution = None;
                if let Err(e) = result {
                    if e.is_unauthenticated() {
                        sessions.invalidate().await;
                    }
                }
            }
        }
    }

    tracing::debug!("[ContextBinding] Stopped");
}

fn start(resolver: &Arc<AcademicContextResolver>, phase: SessionPhase) -> Option<Resolution> {
    let session = match phase {
        SessionPhase::Checking => return None,
        SessionPhase::SignedOut => None,
        SessionPhase::SignedIn(session) => Some(session),
    };
    let resolver = resolver.clone();
    Some(Box::pin(async move { resolver.initialize(session).await }))
}

async fn wait(resolution: &mut Option<Resolution>) -> Result<()> {
    match resolution {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

fn describe(phase: &SessionPhase) -> String {
    match phase {
        SessionPhase::Checking => "checking".to_string(),
        SessionPhase::SignedOut => "signed out".to_string(),
        SessionPhase::SignedIn(session) => format!("signed in as {}", session.id),
    }
}
