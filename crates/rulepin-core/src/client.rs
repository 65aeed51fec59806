//! HTTP client for the filter's user-rule endpoints.

use crate::config::{Config, Credentials, WriteFormat};
use crate::error::{Result, RulepinError};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;

pub const STATUS_PATH: &str = "/control/filtering/status";
pub const SET_RULES_PATH: &str = "/control/filtering/set_rules";

/// Upper bound on every network call made by [`RuleClient`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error response body kept for logging.
const MAX_ERROR_BODY: usize = 512;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FilteringStatus {
    #[serde(deserialize_with = "null_as_empty")]
    user_rules: Vec<String>,
}

/// `"user_rules": null` means the same as an empty list. The field itself
/// must still be present.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
struct SetRulesRequest<'a> {
    rules: &'a [String],
}

// ---------------------------------------------------------------------------
// RuleClient
// ---------------------------------------------------------------------------

/// Reads and replaces the filter's ordered user-rule list.
#[derive(Debug, Clone)]
pub struct RuleClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    write_format: WriteFormat,
}

impl RuleClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RulepinError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
            write_format: config.write_format,
        })
    }

    /// Fetch the current user rules, in filter order.
    pub async fn fetch(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.url(STATUS_PATH))
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .send()
            .await
            .map_err(|source| RulepinError::Transport {
                endpoint: STATUS_PATH,
                source,
            })?;
        let response = ensure_success(STATUS_PATH, response).await?;

        let body = response
            .text()
            .await
            .map_err(|source| RulepinError::Transport {
                endpoint: STATUS_PATH,
                source,
            })?;
        let status: FilteringStatus =
            serde_json::from_str(&body).map_err(|source| RulepinError::Decode {
                endpoint: STATUS_PATH,
                source,
            })?;

        debug!(count = status.user_rules.len(), "decoded user rules");
        Ok(status.user_rules)
    }

    /// Replace the whole user-rule list. Rules missing from `rules` are
    /// deleted on the filter.
    pub async fn write(&self, rules: &[String]) -> Result<()> {
        let body = match self.write_format {
            WriteFormat::Json => serde_json::to_vec(&SetRulesRequest { rules })?,
            WriteFormat::Text => rules.join("\n").into_bytes(),
        };

        let response = self
            .http
            .post(self.url(SET_RULES_PATH))
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .header(CONTENT_TYPE, self.write_format.content_type())
            .body(body)
            .send()
            .await
            .map_err(|source| RulepinError::Transport {
                endpoint: SET_RULES_PATH,
                source,
            })?;
        ensure_success(SET_RULES_PATH, response).await?;

        debug!(count = rules.len(), format = %self.write_format, "wrote user rules");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn ensure_success(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Best effort: the status code alone is enough to report the failure.
    let body = response.text().await.unwrap_or_default();
    Err(RulepinError::UnexpectedStatus {
        endpoint,
        status: status.as_u16(),
        body: truncate(body.trim()),
    })
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    cut.push('…');
    cut
}
