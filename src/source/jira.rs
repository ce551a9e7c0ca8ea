//! HTTP tracker client.
//!
//! Talks to the tracker's REST API (version 2):
//!
//! - `GET {base}/rest/api/2/field` for the field directory
//! - `GET {base}/rest/api/2/search` with `expand=changelog` for issues, paged
//!   `startAt`/`maxResults` until `total` or the caller's cap is reached

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::error::{Error, Result};
use crate::model::{load_issues, FieldDescriptor, Issue};

use super::issue_source::IssueSource;

/// Issues requested per search page.
pub const PAGE_SIZE: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How requests are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// No credentials.
    Anonymous,
    /// Username with API token or password.
    Basic { username: String, token: String },
    /// Personal access token.
    Bearer(String),
}

impl Auth {
    /// Pick the auth scheme from connection settings.
    #[must_use]
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        match (&settings.username, &settings.token) {
            (Some(username), Some(token)) => Self::Basic {
                username: username.clone(),
                token: token.clone(),
            },
            (None, Some(token)) => Self::Bearer(token.clone()),
            _ => Self::Anonymous,
        }
    }
}

/// Tracker REST client.
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    auth: Auth,
}

/// One page of search results.
///
/// Issues stay raw until the page is counted, so skipped issues still
/// advance `startAt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    start_at: usize,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<Value>,
}

impl JiraClient {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no URL is configured, or
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let url = settings
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "No tracker URL configured (set connection.url or TRACKER_URL)".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            auth: Auth::from_settings(settings),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn auth(&self) -> &Auth {
        &self.auth
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);

        let request = self.client.get(&url).query(query);
        let request = match &self.auth {
            Auth::Anonymous => request,
            Auth::Basic { username, token } => request.basic_auth(username, Some(token)),
            Auth::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Tracker {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    message
                },
            });
        }

        Ok(response.json().await?)
    }
}

impl IssueSource for JiraClient {
    fn name(&self) -> &str {
        "jira"
    }

    async fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        let fields: Vec<FieldDescriptor> = self.get_json("/rest/api/2/field", &[]).await?;
        debug!(count = fields.len(), "Fetched field directory");
        Ok(fields)
    }

    async fn search_issues(&self, query: &str, max_results: Option<usize>) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = Vec::new();
        let mut offset = 0;

        loop {
            let wanted = max_results.map_or(PAGE_SIZE, |cap| PAGE_SIZE.min(cap - issues.len()));
            let params = [
                ("jql", query.to_string()),
                ("expand", "changelog".to_string()),
                ("startAt", offset.to_string()),
                ("maxResults", wanted.to_string()),
            ];

            let page: SearchResponse = self.get_json("/rest/api/2/search", &params).await?;
            debug!(
                start_at = page.start_at,
                received = page.issues.len(),
                total = page.total,
                "Fetched search page"
            );

            let received = page.issues.len();
            offset += received;
            issues.extend(load_issues(page.issues));

            let capped = max_results.is_some_and(|cap| issues.len() >= cap);
            if received == 0 || offset >= page.total || capped {
                break;
            }
        }

        if let Some(cap) = max_results {
            issues.truncate(cap);
        }
        Ok(issues)
    }
}
