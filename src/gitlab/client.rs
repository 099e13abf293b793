use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result, TransportError};

/// Authenticated access to the GitLab REST API. Shared by every in-flight
/// handler, so implementations must be safe to call concurrently.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// POST `data` as JSON to an API path such as `/projects/42/issues/7/notes`.
    async fn post(&self, path: &str, data: &Value) -> std::result::Result<Value, TransportError>;
}

#[derive(Clone)]
pub struct GitLabClient {
    http: Client,
    api_base: String,
    access_token: Option<String>,
}

impl GitLabClient {
    pub fn new(
        gitlab_url: &str,
        requester: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(requester)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            api_base: format!("{}/api/v4", gitlab_url.trim_end_matches('/')),
            access_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.gitlab_url,
            &config.requester,
            config.access_token.clone(),
            config.http_timeout,
        )
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PlatformClient for GitLabClient {
    async fn post(&self, path: &str, data: &Value) -> std::result::Result<Value, TransportError> {
        let mut req = self
            .http
            .post(self.url(path))
            .header(header::ACCEPT, "application/json")
            .json(data);
        if let Some(token) = &self.access_token {
            req = req.header("PRIVATE-TOKEN", token);
        }

        let res = req
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        decode(res).await
    }
}

async fn decode(res: Response) -> std::result::Result<Value, TransportError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
}
