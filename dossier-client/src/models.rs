use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Parameters for a person search.
///
/// Only `name` is required; `city` and `extra_terms` narrow the search and may
/// be left empty. The server expects all three fields on the wire, so empty
/// strings are serialized rather than omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub extra_terms: String,
}

impl SearchRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_extra_terms(mut self, terms: impl Into<String>) -> Self {
        self.extra_terms = terms.into();
        self
    }

    /// Local check applied before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Validation(
                "name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Opaque token correlating a submitted search with its progress stream.
///
/// Never parsed client-side; it only travels back in progress requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHandle {
    pub search_id: String,
}

/// Aggregated result of a completed search. Immutable once received; report
/// generation sends a copy back to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub confidence: String,
    pub last_updated: String,
    pub summary: String,
}

/// One progress observation for a submitted search, tagged by `status` on the
/// wire. A `completed` snapshot without a result fails to decode, which is
/// exactly what the protocol forbids. Running snapshots arrive with
/// `"result": null` / `"error": null` padding; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressSnapshot {
    Running {
        percentage: u8,
        stage: String,
    },
    Completed {
        percentage: u8,
        stage: String,
        result: PersonRecord,
    },
    Error {
        percentage: u8,
        stage: String,
        error: String,
    },
}

impl ProgressSnapshot {
    pub fn percentage(&self) -> u8 {
        match self {
            ProgressSnapshot::Running { percentage, .. }
            | ProgressSnapshot::Completed { percentage, .. }
            | ProgressSnapshot::Error { percentage, .. } => *percentage,
        }
    }

    pub fn stage(&self) -> &str {
        match self {
            ProgressSnapshot::Running { stage, .. }
            | ProgressSnapshot::Completed { stage, .. }
            | ProgressSnapshot::Error { stage, .. } => stage,
        }
    }

    /// `completed` and `error` end polling for their handle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressSnapshot::Running { .. })
    }
}

/// Body of a report request: the completed record under the `personData` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub person_data: PersonRecord,
}

/// Server-side location of a generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHandle {
    pub report_path: String,
}
