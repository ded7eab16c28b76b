//! SearchSession – owns one search at a time: submits it, polls its progress
//! until a terminal snapshot, and hands the completed record to report
//! generation.
//!
//! Ownership rules:
//! * the session holds at most one [`PollTask`]; submitting again cancels the
//!   previous one before anything else touches the network,
//! * the poll task checks its cancel flag before applying a response, and the
//!   reducer ignores handles that are no longer current, so a superseded
//!   search can never write into the new search's display state,
//! * dropping the session cancels the poll task with it.
//!
//! Observers read display state through a `tokio::sync::watch` channel; the
//! session itself is the only writer.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    client::{HttpSearchApi, SearchApi},
    config::ClientConfig,
    error::{Result, SearchError},
    models::{PersonRecord, ReportHandle, ReportRequest, SearchHandle, SearchRequest},
    state::{SearchEvent, SearchState, reduce},
};

/// Running poll loop for one submitted search.
///
/// Owns the spawned task and the cancel flag the loop checks before applying
/// anything it received. Dropping it cancels the loop on the spot.
struct PollTask {
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl PollTask {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.join.abort();
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Client-side session over any [`SearchApi`] implementation.
pub struct SearchSession {
    api: Arc<dyn SearchApi>,
    config: ClientConfig,
    state: watch::Sender<SearchState>,
    poll: Mutex<Option<PollTask>>,
}

impl SearchSession {
    pub fn new(api: Arc<dyn SearchApi>, config: ClientConfig) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            api,
            config,
            state,
            poll: Mutex::new(None),
        }
    }

    /// Session talking HTTP to the configured base URL.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let api = HttpSearchApi::new(&config)?;
        Ok(Self::new(Arc::new(api), config))
    }

    /// Submit a search and start polling its progress.
    ///
    /// Validation failures leave the session exactly as it was, including a
    /// still-running previous search. Once validation passes the previous
    /// search is cancelled, win or lose: a submission that fails on the wire
    /// leaves the session in the failed display state.
    pub async fn submit(&self, request: SearchRequest) -> Result<SearchHandle> {
        request.validate()?;

        self.cancel_poll();

        let handle = match self.api.submit(&request).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "search submission failed");
                self.apply(SearchEvent::SubmitFailed {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        info!(search_id = %handle.search_id, "search accepted");
        self.apply(SearchEvent::Started {
            handle: handle.clone(),
        });

        let cancelled = Arc::new(AtomicBool::new(false));
        let join = tokio::spawn(
            PollLoop {
                api: self.api.clone(),
                state: self.state.clone(),
                handle: handle.clone(),
                cancelled: cancelled.clone(),
                poll_interval: self.config.poll_interval,
                max_polls: self.config.max_polls,
            }
            .run(),
        );
        *self.poll.lock().unwrap() = Some(PollTask { cancelled, join });

        Ok(handle)
    }

    /// Ask the server to persist a report for the completed result.
    ///
    /// Fails with [`SearchError::NoResult`] before any network call when the
    /// session holds no completed record.
    pub async fn generate_report(&self) -> Result<ReportHandle> {
        let record = self
            .state
            .borrow()
            .record()
            .cloned()
            .ok_or(SearchError::NoResult)?;

        let report = self
            .api
            .generate_report(&ReportRequest {
                person_data: record,
            })
            .await?;
        info!(report_path = %report.report_path, "report generated");
        Ok(report)
    }

    /// Abandon the current search or result; display state returns to idle.
    pub fn cancel(&self) {
        self.cancel_poll();
        self.apply(SearchEvent::Cancelled);
    }

    /// Current display state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Observe display-state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Wait until the session is no longer running a search.
    ///
    /// Returns immediately when nothing is running.
    pub async fn wait_for_terminal(&self) -> SearchState {
        let mut rx = self.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if !matches!(current, SearchState::Running { .. }) {
                return current;
            }
            if rx.changed().await.is_err() {
                return current;
            }
        }
    }

    /// Wait for the current search and hand back its record.
    ///
    /// A failed search maps to [`SearchError::Server`] carrying the message
    /// the display state holds; an idle session maps to
    /// [`SearchError::NoResult`].
    pub async fn wait_for_result(&self) -> Result<PersonRecord> {
        match self.wait_for_terminal().await {
            SearchState::Completed { record } => Ok(record),
            SearchState::Failed { message } => Err(SearchError::Server(message)),
            SearchState::Idle | SearchState::Running { .. } => Err(SearchError::NoResult),
        }
    }

    fn apply(&self, event: SearchEvent) {
        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state), event));
    }

    fn cancel_poll(&self) {
        if let Some(task) = self.poll.lock().unwrap().take() {
            debug!("cancelling previous poll task");
            task.cancel();
        }
    }
}

struct PollLoop {
    api: Arc<dyn SearchApi>,
    state: watch::Sender<SearchState>,
    handle: SearchHandle,
    cancelled: Arc<AtomicBool>,
    poll_interval: Duration,
    max_polls: u32,
}

impl PollLoop {
    async fn run(self) {
        let mut ticker = time::interval(self.poll_interval);
        // A slow response must not be followed by a burst of catch-up ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for _ in 0..self.max_polls {
            ticker.tick().await;
            if self.cancelled.load(Ordering::SeqCst) {
                return;
            }

            match self.api.progress(&self.handle).await {
                Ok(snapshot) => {
                    if self.cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    debug!(
                        search_id = %self.handle.search_id,
                        percentage = snapshot.percentage(),
                        stage = %snapshot.stage(),
                        "progress"
                    );
                    let terminal = snapshot.is_terminal();
                    self.apply(SearchEvent::Progressed {
                        handle: self.handle.clone(),
                        snapshot,
                    });
                    if terminal {
                        info!(search_id = %self.handle.search_id, "search finished");
                        return;
                    }
                }
                Err(err) => {
                    if self.cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    warn!(
                        search_id = %self.handle.search_id,
                        error = %err,
                        "progress check failed"
                    );
                    self.apply(SearchEvent::PollFailed {
                        handle: self.handle.clone(),
                        message: err.to_string(),
                    });
                    return;
                }
            }
        }

        warn!(
            search_id = %self.handle.search_id,
            attempts = self.max_polls,
            "poll ceiling exhausted"
        );
        self.apply(SearchEvent::TimedOut {
            handle: self.handle.clone(),
            attempts: self.max_polls,
        });
    }

    fn apply(&self, event: SearchEvent) {
        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state), event));
    }
}
