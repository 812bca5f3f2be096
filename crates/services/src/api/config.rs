use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_PREFIX: &str = "/institution/student";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for the exam REST API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub prefix: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            prefix: DEFAULT_PREFIX.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Read `EXAM_API_URL`, `EXAM_API_PREFIX`, `EXAM_API_TOKEN` and
    /// `EXAM_API_TIMEOUT_SECS`, falling back to defaults for anything unset or blank.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout = non_blank("EXAM_API_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.timeout, Duration::from_secs);

        Self {
            base_url: non_blank("EXAM_API_URL").unwrap_or(defaults.base_url),
            prefix: non_blank("EXAM_API_PREFIX").unwrap_or(defaults.prefix),
            token: non_blank("EXAM_API_TOKEN"),
            timeout,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL plus prefix plus `segments`, each segment percent-encoded so
    /// ids containing `/`, `?` or `#` stay inside their path segment.
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidUrl` if the base URL does not parse or cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(self.base_url.trim())
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?;
            path.pop_if_empty();
            path.extend(self.prefix.split('/').filter(|s| !s.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }
}
