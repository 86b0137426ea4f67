//! Debounced, single-flight query controller.
//!
//! A background task owns all query state. Callers push filter and identity
//! changes through a channel and observe [`QueryState`] through a watch
//! channel. Filter changes wait out a quiescence window before the pipeline
//! runs; only the most recently started execution may update the state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};

use crate::config::ControllerConfig;
use crate::errors::DashboardError;
use crate::models::filter::{CanonicalFilter, FilterRequest};
use crate::models::metrics::DashboardResult;
use crate::models::user::Identity;
use crate::services::fingerprint::short_key;
use crate::services::pipeline::DashboardPipeline;
use crate::services::retry::with_retry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failure,
}

/// What the presentation layer sees.
///
/// `data` is the last successful result and survives later failures and
/// reloads. `is_stale` is set whenever `data` does not belong to the current
/// filter or is older than the freshness window.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub status: QueryStatus,
    pub filter: Option<CanonicalFilter>,
    pub data: Option<Arc<DashboardResult>>,
    pub error: Option<DashboardError>,
    pub is_stale: bool,
    /// A filter change is waiting out the debounce window.
    pub change_pending: bool,
    /// Generation of the execution that produced the current status.
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    acknowledged: u64,
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

enum Command {
    SetIdentity(Option<Identity>),
    SetFilters(FilterRequest),
    Retry,
}

/// Handle to a running controller. Dropping it tears the controller down;
/// executions still in flight are cancelled and never touch the state.
pub struct QueryController {
    commands: mpsc::UnboundedSender<(u64, Command)>,
    state: watch::Receiver<QueryState>,
    task: JoinHandle<()>,
    issued: AtomicU64,
}

impl QueryController {
    /// Start the controller task on the current runtime.
    pub fn spawn(pipeline: DashboardPipeline, config: ControllerConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(QueryState::default());
        let worker = Worker {
            pipeline,
            config,
            state: state_tx,
            identity: None,
            request: FilterRequest::default(),
            deadline: None,
            next_generation: 0,
            latest: None,
            in_flight: HashMap::new(),
            cache: HashMap::new(),
            tasks: JoinSet::new(),
        };
        let task = tokio::spawn(worker.run(rx));
        Self {
            commands,
            state,
            task,
            issued: AtomicU64::new(0),
        }
    }

    /// Provide or clear the caller identity. Without one, executions are
    /// deferred.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.send(Command::SetIdentity(identity));
    }

    /// Replace the filter. Executes once no further change arrives within
    /// the debounce window.
    pub fn set_filters(&self, request: FilterRequest) {
        self.send(Command::SetFilters(request));
    }

    /// Re-run the current filter now, bypassing the cache.
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Wait until every command sent so far is processed, no change is
    /// pending and nothing is loading.
    pub async fn settled(&self) -> QueryState {
        let target = self.issued.load(Ordering::SeqCst);
        let mut rx = self.state.clone();
        let result = rx
            .wait_for(|s| s.acknowledged >= target && !s.change_pending && !s.is_loading())
            .await
            .map(|s| s.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.snapshot(),
        }
    }

    fn send(&self, command: Command) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.commands.send((seq, command)).is_err() {
            tracing::debug!("Query controller already stopped");
        }
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Completion {
    generation: u64,
    filter: CanonicalFilter,
    result: Result<DashboardResult, DashboardError>,
}

struct CacheEntry {
    result: Arc<DashboardResult>,
    fetched_at: Instant,
}

struct Worker {
    pipeline: DashboardPipeline,
    config: ControllerConfig,
    state: watch::Sender<QueryState>,
    identity: Option<Identity>,
    request: FilterRequest,
    deadline: Option<Instant>,
    next_generation: u64,
    /// Generation whose completion may update the state.
    latest: Option<u64>,
    in_flight: HashMap<CanonicalFilter, u64>,
    cache: HashMap<CanonicalFilter, CacheEntry>,
    tasks: JoinSet<Completion>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<(u64, Command)>) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some((seq, command)) = command else { break };
                    self.handle(command);
                    self.state.send_modify(|s| s.acknowledged = seq);
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.on_joined(joined);
                }
                _ = sleep_until(self.deadline.unwrap_or_else(Instant::now)), if self.deadline.is_some() => {
                    self.deadline = None;
                    self.dispatch(false);
                }
            }
        }
        tracing::debug!("Query controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetIdentity(identity) => {
                if identity == self.identity {
                    return;
                }
                self.reset();
                self.identity = identity;
                if self.identity.is_some() {
                    self.dispatch(false);
                }
            }
            Command::SetFilters(request) => {
                self.request = request;
                self.deadline = Some(Instant::now() + self.config.debounce);
                self.state.send_modify(|s| s.change_pending = true);
            }
            Command::Retry => {
                self.deadline = None;
                self.dispatch(true);
            }
        }
    }

    /// Forget everything tied to the previous identity.
    fn reset(&mut self) {
        self.tasks.abort_all();
        self.in_flight.clear();
        self.cache.clear();
        self.latest = None;
        self.deadline = None;
        self.state.send_modify(|s| {
            let acknowledged = s.acknowledged;
            *s = QueryState {
                acknowledged,
                ..Default::default()
            };
        });
    }

    fn dispatch(&mut self, force: bool) {
        let Some(identity) = &self.identity else {
            tracing::debug!("No identity yet, deferring query");
            self.state.send_modify(|s| s.change_pending = false);
            return;
        };

        let filter = match self.pipeline.plan(identity, &self.request) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!(error = %e, "Query rejected before fetching");
                self.latest = None;
                self.state.send_modify(|s| {
                    s.status = QueryStatus::Failure;
                    s.error = Some(e);
                    s.change_pending = false;
                    s.is_stale = s.data.is_some();
                    s.updated_at = Some(Utc::now());
                });
                return;
            }
        };

        self.evict_expired();

        if !force {
            if let Some(entry) = self.cache.get(&filter) {
                let fresh = entry.fetched_at.elapsed() < self.config.stale_time;
                let data = Arc::clone(&entry.result);
                if fresh {
                    tracing::debug!(filter_key = %short_key(&filter), "Serving cached result");
                    self.latest = None;
                    self.state.send_modify(|s| {
                        s.status = QueryStatus::Success;
                        s.filter = Some(filter);
                        s.data = Some(data);
                        s.error = None;
                        s.is_stale = false;
                        s.change_pending = false;
                        s.updated_at = Some(Utc::now());
                    });
                    return;
                }
                // Show the old result while revalidating.
                self.state.send_modify(|s| s.data = Some(data));
            }
        }

        let generation = match self.in_flight.get(&filter) {
            Some(&generation) => {
                tracing::debug!(filter_key = %short_key(&filter), generation, "Joining in-flight query");
                generation
            }
            None => self.start(filter.clone()),
        };
        self.latest = Some(generation);

        self.state.send_modify(|s| {
            s.status = QueryStatus::Loading;
            s.is_stale = s.data.is_some();
            s.filter = Some(filter);
            s.change_pending = false;
            s.generation = generation;
        });
    }

    fn start(&mut self, filter: CanonicalFilter) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.in_flight.insert(filter.clone(), generation);

        tracing::info!(filter_key = %short_key(&filter), generation, "Starting dashboard query");

        let pipeline = self.pipeline.clone();
        let policy = self.config.retry.clone();
        self.tasks.spawn(async move {
            let result = with_retry(&policy, |_| pipeline.execute(&filter)).await;
            Completion {
                generation,
                filter,
                result,
            }
        });
        generation
    }

    fn on_joined(&mut self, joined: Result<Completion, JoinError>) {
        let completion = match joined {
            Ok(completion) => completion,
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                tracing::error!(error = %e, "Dashboard query task failed");
                self.in_flight.clear();
                if self.latest.take().is_some() {
                    self.state.send_modify(|s| {
                        s.status = QueryStatus::Failure;
                        s.error = Some(DashboardError::Internal("query task failed".to_string()));
                        s.updated_at = Some(Utc::now());
                    });
                }
                return;
            }
        };

        let Completion {
            generation,
            filter,
            result,
        } = completion;

        if self.in_flight.get(&filter) == Some(&generation) {
            self.in_flight.remove(&filter);
        }

        let result = result.map(Arc::new);
        if let Ok(data) = &result {
            self.cache.insert(
                filter.clone(),
                CacheEntry {
                    result: Arc::clone(data),
                    fetched_at: Instant::now(),
                },
            );
        }

        if self.latest != Some(generation) {
            tracing::debug!(generation, "Discarding superseded query result");
            return;
        }
        self.latest = None;

        match result {
            Ok(data) => self.state.send_modify(|s| {
                s.status = QueryStatus::Success;
                s.data = Some(data);
                s.error = None;
                s.is_stale = false;
                s.updated_at = Some(Utc::now());
            }),
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::warn!(error = %e, "Query rejected by source, caller must sign in again");
                } else {
                    tracing::error!(error = %e, generation, "Dashboard query failed");
                }
                self.state.send_modify(|s| {
                    s.status = QueryStatus::Failure;
                    s.error = Some(e);
                    s.is_stale = s.data.is_some();
                    s.updated_at = Some(Utc::now());
                });
            }
        }
    }

    fn evict_expired(&mut self) {
        let ttl = self.config.cache_ttl;
        self.cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }
}
