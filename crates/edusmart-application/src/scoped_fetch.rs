//! Context-scoped data fetching.
//!
//! A [`FetchHandle`] keeps one endpoint in sync with the active campus and
//! year: every scope change (and every explicit refetch) issues a new read
//! with `academicYearId` and `campusId` appended. A newer trigger aborts the
//! request in flight, so a response for an outdated scope is never applied.

use crate::academic_context::{AcademicContextResolver, ContextSnapshot};
use edusmart_core::academic::ContextScope;
use edusmart_core::error::{EduError, Result};
use edusmart_core::resource::ResourceReader;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Only fetch on `refetch()`; scope and endpoint changes are not followed.
    pub manual: bool,
}

impl FetchOptions {
    pub fn manual() -> Self {
        Self { manual: true }
    }
}

/// Observable state of one scoped read.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<EduError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug)]
enum FetchCommand {
    Refetch,
    SetEndpoint(String),
}

type InFlight = Pin<Box<dyn Future<Output = (u64, Result<Value>)> + Send>>;

/// Factory for scoped reads tied to one session.
#[derive(Clone)]
pub struct ScopedFetcher {
    reader: Arc<dyn ResourceReader>,
    context: watch::Receiver<ContextSnapshot>,
    session_token: CancellationToken,
}

impl ScopedFetcher {
    /// # Arguments
    ///
    /// * `reader` - Backend read port
    /// * `resolver` - Source of the active scope
    /// * `session_token` - Cancelled at logout; stops every handle created here
    pub fn new(
        reader: Arc<dyn ResourceReader>,
        resolver: &AcademicContextResolver,
        session_token: CancellationToken,
    ) -> Self {
        Self {
            reader,
            context: resolver.subscribe(),
            session_token,
        }
    }

    /// Starts following `endpoint` with default options.
    pub fn fetch<T>(&self, endpoint: impl Into<String>) -> FetchHandle<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.fetch_with(endpoint, FetchOptions::default())
    }

    /// Starts following `endpoint`.
    ///
    /// Must be called within a tokio runtime.
    pub fn fetch_with<T>(&self, endpoint: impl Into<String>, options: FetchOptions) -> FetchHandle<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let (state_tx, state_rx) = watch::channel(FetchState::default());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let stop = self.session_token.child_token();

        let task = FetchTask {
            reader: self.reader.clone(),
            context: self.context.clone(),
            commands: command_rx,
            state: state_tx,
            stop: stop.clone(),
            endpoint: endpoint.into(),
            options,
            scope: None,
            seq: 0,
            in_flight: None,
        };
        tokio::spawn(task.run());

        FetchHandle {
            state: state_rx,
            commands: command_tx,
            stop,
        }
    }
}

/// Handle to a running scoped read. Dropping it stops the read.
pub struct FetchHandle<T> {
    state: watch::Receiver<FetchState<T>>,
    commands: mpsc::UnboundedSender<FetchCommand>,
    stop: CancellationToken,
}

impl<T: Clone> FetchHandle<T> {
    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }
}

impl<T> FetchHandle<T> {
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.clone()
    }

    /// Re-issues the read with the current scope.
    pub fn refetch(&self) {
        let _ = self.commands.send(FetchCommand::Refetch);
    }

    /// Points the read at another endpoint.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        let _ = self.commands.send(FetchCommand::SetEndpoint(endpoint.into()));
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

impl<T> Drop for FetchHandle<T> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

struct FetchTask<T> {
    reader: Arc<dyn ResourceReader>,
    context: watch::Receiver<ContextSnapshot>,
    commands: mpsc::UnboundedReceiver<FetchCommand>,
    state: watch::Sender<FetchState<T>>,
    stop: CancellationToken,
    endpoint: String,
    options: FetchOptions,
    scope: Option<ContextScope>,
    /// Sequence of the latest issued request.
    seq: u64,
    in_flight: Option<InFlight>,
}

impl<T> FetchTask<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn run(mut self) {
        self.scope = self.context.borrow_and_update().scope();
        if !self.options.manual {
            self.start();
        }

        loop {
            tokio::select! {
                biased;

                _ = self.stop.cancelled() => break,

                command = self.commands.recv() => match command {
                    Some(FetchCommand::Refetch) => self.start(),
                    Some(FetchCommand::SetEndpoint(endpoint)) => {
                        if endpoint != self.endpoint {
                            self.endpoint = endpoint;
                            if !self.options.manual {
                                self.start();
                            }
                        }
                    }
                    None => break,
                },

                changed = self.context.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let scope = self.context.borrow_and_update().scope();
                    if scope != self.scope {
                        self.scope = scope;
                        self.on_scope_change();
                    }
                }

                (seq, result) = next_result(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.apply(seq, result);
                }
            }
        }

        tracing::debug!("[ScopedFetcher] Stopped following {}", self.endpoint);
    }

    fn on_scope_change(&mut self) {
        // Anything in flight belongs to the old scope
        self.abort();
        if !self.options.manual && self.scope.is_some() {
            self.start();
        }
    }

    /// Issues a request for the current endpoint and scope.
    fn start(&mut self) {
        self.abort();

        let Some(scope) = &self.scope else {
            tracing::debug!(
                "[ScopedFetcher] No active campus/year; not fetching {}",
                self.endpoint
            );
            return;
        };

        self.seq += 1;
        let seq = self.seq;
        let reader = self.reader.clone();
        let endpoint = self.endpoint.clone();
        let query = scope.query_params();
        tracing::debug!("[ScopedFetcher] #{} GET {} {:?}", seq, endpoint, query);

        self.in_flight = Some(Box::pin(async move {
            let result = reader.get_json(&endpoint, &query).await;
            (seq, result)
        }));
        self.state.send_modify(|state| state.loading = true);
    }

    fn abort(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::debug!("[ScopedFetcher] Aborted request #{}", self.seq);
            self.state.send_modify(|state| state.loading = false);
        }
    }

    fn apply(&mut self, seq: u64, result: Result<Value>) {
        if seq != self.seq {
            tracing::debug!("[ScopedFetcher] Dropping stale response #{}", seq);
            return;
        }

        let decoded = result.and_then(|value| serde_json::from_value::<T>(value).map_err(EduError::from));
        self.state.send_modify(|state| {
            state.loading = false;
            match decoded {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!("[ScopedFetcher] {} failed: {}", self.endpoint, e);
                    // Previous data stays visible
                    state.error = Some(e);
                }
            }
        });
    }
}

async fn next_result(in_flight: &mut Option<InFlight>) -> (u64, Result<Value>) {
    match in_flight {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
