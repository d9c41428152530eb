//! Async HTTP client for the ClickUp v1 REST API.
//!
//! Every call returns the decoded JSON body as-is, envelope included
//! (`{"user": ...}`, `{"teams": [...]}`). Callers decide how to unwrap it.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::query::TaskQuery;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ClientError::InvalidConfig {
                msg: "an API key is required".to_string(),
            })?;

        let mut auth = HeaderValue::from_str(key).map_err(|e| ClientError::InvalidConfig {
            msg: format!("API key is not a valid header value: {}", e),
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, route: &str, query: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.endpoint, route);
        debug!(url = %url, params = query.len(), "GET");

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            url,
            msg: e.to_string(),
        })
    }

    /// The authenticated user, wrapped as `{"user": {...}}`.
    pub async fn user(&self) -> Result<Value> {
        self.get("user", &[]).await
    }

    /// Teams the user belongs to, wrapped as `{"teams": [...]}`.
    pub async fn teams(&self) -> Result<Value> {
        self.get("team", &[]).await
    }

    pub async fn team(&self, id: &str) -> Result<Value> {
        self.get(&format!("team/{}", id), &[]).await
    }

    pub async fn spaces(&self, team_id: &str) -> Result<Value> {
        self.get(&format!("team/{}/space", team_id), &[]).await
    }

    pub async fn projects(&self, space_id: &str) -> Result<Value> {
        self.get(&format!("space/{}/project", space_id), &[]).await
    }

    pub async fn tasks(&self, team_id: &str, query: &TaskQuery) -> Result<Value> {
        self.get(&format!("team/{}/task", team_id), &query.to_pairs())
            .await
    }
}
