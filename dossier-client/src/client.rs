use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    config::ClientConfig,
    error::{Result, SearchError},
    models::{ProgressSnapshot, ReportHandle, ReportRequest, SearchHandle, SearchRequest},
};

const SUBMIT_ENDPOINT: &str = "/osint";
const PROGRESS_ENDPOINT: &str = "/progress";
const REPORT_ENDPOINT: &str = "/generate-report";
const HOME_ENDPOINT: &str = "/";

/// Remote surface of the search service.
///
/// `SearchSession` drives everything through this trait, so tests can swap the
/// HTTP implementation for a scripted one.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Start a search and return its correlation handle.
    async fn submit(&self, request: &SearchRequest) -> Result<SearchHandle>;

    /// Fetch the latest progress snapshot for a handle.
    async fn progress(&self, handle: &SearchHandle) -> Result<ProgressSnapshot>;

    /// Ask the server to persist a report for a completed result.
    async fn generate_report(&self, request: &ReportRequest) -> Result<ReportHandle>;

    /// Deployment smoke check; returns the service banner.
    async fn ping(&self) -> Result<String>;
}

/// `SearchApi` over HTTP, matching the service's JSON wire format.
pub struct HttpSearchApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSearchApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn submit(&self, request: &SearchRequest) -> Result<SearchHandle> {
        let response = self
            .http
            .post(self.url(SUBMIT_ENDPOINT))
            .json(request)
            .send()
            .await?;
        read_json(response, SUBMIT_ENDPOINT).await
    }

    async fn progress(&self, handle: &SearchHandle) -> Result<ProgressSnapshot> {
        let url = format!("{}{}/{}", self.base_url, PROGRESS_ENDPOINT, handle.search_id);
        let response = self.http.get(&url).send().await?;
        let snapshot: ProgressSnapshot = read_json(response, PROGRESS_ENDPOINT).await?;
        if snapshot.percentage() > 100 {
            return Err(SearchError::Payload {
                endpoint: PROGRESS_ENDPOINT,
                detail: format!("percentage {} is out of range", snapshot.percentage()),
            });
        }
        Ok(snapshot)
    }

    async fn generate_report(&self, request: &ReportRequest) -> Result<ReportHandle> {
        let response = self
            .http
            .post(self.url(REPORT_ENDPOINT))
            .json(request)
            .send()
            .await?;
        read_json(response, REPORT_ENDPOINT).await
    }

    async fn ping(&self) -> Result<String> {
        let response = self.http.get(self.url(HOME_ENDPOINT)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                endpoint: HOME_ENDPOINT,
                status,
            });
        }
        Ok(response.text().await?)
    }
}

/// Decode a JSON body after insisting on a success status.
///
/// The body is read as text first so a decode failure can say what actually
/// came back instead of a bare serde error position.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Http { endpoint, status });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SearchError::Payload {
        endpoint,
        detail: e.to_string(),
    })
}
