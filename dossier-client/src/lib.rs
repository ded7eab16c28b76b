pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use client::{HttpSearchApi, SearchApi};
pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL};
pub use error::{Result, SearchError};
pub use models::{
    PersonRecord, ProgressSnapshot, ReportHandle, ReportRequest, SearchHandle, SearchRequest,
};
pub use session::SearchSession;
pub use state::{STARTING_STAGE, SearchEvent, SearchState, reduce};
