use std::time::Duration;

/// Base URL used when neither the environment nor the caller picks one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:6969";

/// Environment variable that selects the deployment to talk to.
pub const BASE_URL_ENV: &str = "DOSSIER_BASE_URL";

/// Tuning knobs for a search session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, without a trailing slash.
    pub base_url: String,
    /// Delay between progress checks.
    pub poll_interval: Duration,
    /// Ceiling on progress checks per search; exceeding it fails the search.
    pub max_polls: u32,
    /// Per-request timeout on the underlying HTTP client.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(500),
            // 60 checks at 500ms, roughly the half minute a search is allowed
            // to run before the client gives up on it.
            max_polls: 60,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Defaults with the base URL taken from `DOSSIER_BASE_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:6969");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_polls, 60);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = ClientConfig::default().with_base_url("https://dossier.example.com/");
        assert_eq!(config.base_url, "https://dossier.example.com");
    }
}
