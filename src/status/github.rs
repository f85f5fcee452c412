use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::{StatusPayload, StatusPublisher};

const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
const MAX_RETRIES: u8 = 8;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

const CHANGE_STATUS_MUTATION: &str = r#"
mutation ChangeUserStatus($emoji: String!, $message: String!) {
  changeUserStatus(input: {emoji: $emoji, message: $message}) {
    status {
      emoji
      message
    }
  }
}
"#;

/// Sets the authenticated user's GitHub profile status via GraphQL.
///
/// - 2xx without GraphQL `errors` → `Ok(true)`
/// - 4xx, or GraphQL `errors` → `Ok(false)` (not retried)
/// - 5xx / transport failure → retried with backoff, then 5xx → `Ok(false)`,
///   transport → `Err`
#[derive(Clone)]
pub struct GitHubStatusUpdater {
    token: String,
    api_url: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    backoff_base: Duration,
}

impl GitHubStatusUpdater {
    pub fn new(token: String) -> Self {
        Self {
            token,
            api_url: DEFAULT_API_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.clamp(1, MAX_RETRIES);
        self
    }

    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// `base * 2^(attempt-1)`, capped at [`MAX_BACKOFF`].
    fn backoff_delay(&self, attempt: u8) -> Duration {
        let factor = 1u32
            .checked_shl(u32::from(attempt.saturating_sub(1)))
            .unwrap_or(u32::MAX);
        self.backoff_base
            .checked_mul(factor)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    async fn backoff(&self, attempt: u8) {
        tokio::time::sleep(self.backoff_delay(attempt)).await;
    }

    pub async fn update_status(&self, status: &StatusPayload) -> Result<bool> {
        let payload = GraphQlRequest {
            query: CHANGE_STATUS_MUTATION,
            variables: Variables {
                emoji: &status.emoji,
                message: &status.message,
            },
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.api_url)
                .timeout(self.timeout)
                .bearer_auth(&self.token)
                .header(reqwest::header::USER_AGENT, "diary-mood-status")
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    let code = rsp.status();
                    if code.is_server_error() && attempt < self.max_retries {
                        tracing::warn!(status = %code, attempt, "github status update failed, retrying");
                        self.backoff(attempt).await;
                        continue;
                    }
                    if !code.is_success() {
                        tracing::warn!(status = %code, "github status update rejected");
                        return Ok(false);
                    }
                    let body: Value = match rsp.json().await {
                        Ok(v) => v,
                        Err(e) => {
                            tracing::warn!(error = %e, status = %code, "github status response is not json");
                            Value::Null
                        }
                    };
                    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
                        tracing::warn!(errors = %errors, "github status update returned graphql errors");
                        return Ok(false);
                    }
                    return Ok(true);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tracing::warn!(error = %e, attempt, "github request failed, retrying");
                        self.backoff(attempt).await;
                        continue;
                    }
                    return Err(anyhow!("GitHub status request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl StatusPublisher for GitHubStatusUpdater {
    async fn publish(&self, status: &StatusPayload) -> Result<bool> {
        self.update_status(status).await
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    emoji: &'a str,
    message: &'a str,
}
