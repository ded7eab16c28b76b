//! Display state of a search session and the pure reducer that advances it.
//!
//! Every transition goes through [`reduce`]. The rules it encodes:
//! * user-initiated events (a new submission, a cancel) always apply and start
//!   a fresh lifecycle,
//! * handle-scoped events (snapshots, poll failures, the poll ceiling) apply
//!   only while the same search is still running,
//! * terminal states absorb stragglers, so a slow in-flight response can never
//!   resurrect a finished search.

use crate::error::SearchError;
use crate::models::{PersonRecord, ProgressSnapshot, SearchHandle};

/// Stage label shown between submission and the first snapshot.
pub const STARTING_STAGE: &str = "Starting search...";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// No search submitted yet, or the last one was abandoned.
    #[default]
    Idle,
    /// A search is in flight; fields mirror the latest snapshot.
    Running {
        handle: SearchHandle,
        percentage: u8,
        stage: String,
    },
    /// Terminal: the search produced a result.
    Completed { record: PersonRecord },
    /// Terminal: the search failed; `message` is what the user sees.
    Failed { message: String },
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchState::Completed { .. } | SearchState::Failed { .. }
        )
    }

    /// The completed record, when there is one.
    pub fn record(&self) -> Option<&PersonRecord> {
        match self {
            SearchState::Completed { record } => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A submission was accepted; polling is about to start.
    Started { handle: SearchHandle },
    /// The submission itself failed, before any handle existed.
    SubmitFailed { message: String },
    /// A snapshot arrived for `handle`.
    Progressed {
        handle: SearchHandle,
        snapshot: ProgressSnapshot,
    },
    /// A progress check failed for `handle`; polling has stopped.
    PollFailed {
        handle: SearchHandle,
        message: String,
    },
    /// The poll ceiling was exhausted for `handle`.
    TimedOut { handle: SearchHandle, attempts: u32 },
    /// The user abandoned the session's current search or result.
    Cancelled,
}

/// Advance the display state by one event.
pub fn reduce(state: SearchState, event: SearchEvent) -> SearchState {
    match event {
        SearchEvent::Started { handle } => SearchState::Running {
            handle,
            percentage: 0,
            stage: STARTING_STAGE.to_string(),
        },
        SearchEvent::SubmitFailed { message } => SearchState::Failed { message },
        SearchEvent::Cancelled => SearchState::Idle,

        SearchEvent::Progressed { handle, snapshot } => match state {
            SearchState::Running {
                handle: current, ..
            } if current == handle => apply_snapshot(handle, snapshot),
            other => other,
        },
        SearchEvent::PollFailed { handle, message } => match state {
            SearchState::Running {
                handle: current, ..
            } if current == handle => SearchState::Failed { message },
            other => other,
        },
        SearchEvent::TimedOut { handle, attempts } => match state {
            SearchState::Running {
                handle: current, ..
            } if current == handle => SearchState::Failed {
                message: SearchError::Timeout { attempts }.to_string(),
            },
            other => other,
        },
    }
}

fn apply_snapshot(handle: SearchHandle, snapshot: ProgressSnapshot) -> SearchState {
    match snapshot {
        ProgressSnapshot::Running { percentage, stage } => SearchState::Running {
            handle,
            percentage,
            stage,
        },
        ProgressSnapshot::Completed { result, .. } => SearchState::Completed { record: result },
        ProgressSnapshot::Error { error, .. } => SearchState::Failed { message: error },
    }
}
