use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Everything that can go wrong between submitting a search and holding a report.
///
/// All variants are non-fatal for the session: a failed search leaves the
/// session usable for the next one, and nothing is retried automatically.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The request was rejected locally, before any network traffic.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server could not be reached or the connection broke mid-request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}")]
    Http {
        endpoint: &'static str,
        status: StatusCode,
    },

    /// The response body did not match the wire contract.
    #[error("malformed response from {endpoint}: {detail}")]
    Payload {
        endpoint: &'static str,
        detail: String,
    },

    /// The search itself failed; the message is what the server reported.
    #[error("search failed: {0}")]
    Server(String),

    /// A report was requested while no completed result is held.
    #[error("no completed search result is available")]
    NoResult,

    /// The progress poll ceiling was exhausted without a terminal snapshot.
    #[error("search timed out after {attempts} progress checks")]
    Timeout { attempts: u32 },
}
