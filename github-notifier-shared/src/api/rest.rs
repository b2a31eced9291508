//! Minimal REST client for the notifications endpoint.

use std::time::Duration;

use super::NotificationDto;
use super::endpoints as ep;

const USER_AGENT: &str = concat!("github-notifier/", env!("CARGO_PKG_VERSION"));
const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("build request: {0}")]
    RequestBuild(String),
    #[error("http: {0}")]
    Transport(String),
    #[error("decode (status {status}): {message}")]
    Decode { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base: String,
    pub username: String,
    /// Whole-request timeout. `None` waits for the server indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base: super::DEFAULT_API_BASE.to_string(),
            username: super::DEFAULT_AUTH_USERNAME.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    url: String,
    username: String,
}

impl GitHubClient {
    pub fn new(opts: &ClientOptions) -> Result<Self, RestError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RestError::RequestBuild(e.to_string()))?;
        Ok(Self {
            http,
            url: ep::notifications(&opts.base),
            username: opts.username.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the first page of notifications. The token is sent as the Basic auth password.
    pub async fn notifications(&self, token: &str) -> Result<Vec<NotificationDto>, RestError> {
        let req = self
            .http
            .get(&self.url)
            .basic_auth(&self.username, Some(token))
            .header(reqwest::header::ACCEPT, ACCEPT_GITHUB_JSON)
            .build()
            .map_err(|e| RestError::RequestBuild(e.to_string()))?;
        let res = self
            .http
            .execute(req)
            .await
            .map_err(|e| RestError::Transport(e.to_string()))?;
        decode_json(res).await
    }
}

async fn decode_json<T: for<'de> serde::Deserialize<'de>>(
    res: reqwest::Response,
) -> Result<T, RestError> {
    let status = res.status();
    let body = res
        .bytes()
        .await
        .map_err(|e| RestError::Transport(e.to_string()))?;
    serde_json::from_slice::<T>(&body).map_err(|e| {
        let message = if status.is_success() {
            e.to_string()
        } else {
            format!("{e}; body: {}", String::from_utf8_lossy(&body))
        };
        RestError::Decode {
            status: status.as_u16(),
            message,
        }
    })
}
