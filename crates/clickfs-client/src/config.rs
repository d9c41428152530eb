use serde::{Deserialize, Serialize};

/// Base URL of the public ClickUp API.
pub const DEFAULT_API_URL: &str = "https://api.clickup.com";
/// Environment variable holding the personal API token.
pub const API_KEY_ENV: &str = "CLICKUP_API_KEY";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CLICKUP_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Defaults overlaid with `CLICKUP_API_KEY` and `CLICKUP_API_URL` when set.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// These settings overlaid with the process environment.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// Overlay non-empty values of the API variables as returned by `var`.
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(API_URL_ENV).filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Root of the versioned API, always ending in a slash.
    pub fn endpoint(&self) -> String {
        format!("{}/api/v1/", self.api_url.trim_end_matches('/'))
    }
}
