//! mem0 REST API client.
//!
//! Implements [`MemoryStore`] against the hosted mem0 platform (or any server
//! speaking the same v1 API). Search responses may be a bare JSON array or an
//! object with a `results` array, depending on API version; both are accepted.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{Record, ScopeFilter, SearchResult};
use super::MemoryStore;
use crate::config::MemoryConfig;
use crate::error::{Error, Result};

/// Records requested per search call unless overridden.
pub const DEFAULT_TOP_K: usize = 10;

/// HTTP client for the mem0 memory API.
#[derive(Debug, Clone)]
pub struct Mem0Client {
    http: reqwest::Client,
    base_url: String,
    top_k: usize,
}

/// Body of `POST /v1/memories/search/`.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    threshold: f64,
    top_k: usize,
    #[serde(flatten)]
    scope: &'a ScopeFilter,
}

/// Body of `POST /v1/memories/`.
#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    messages: [Message<'a>; 1],
    #[serde(flatten)]
    scope: &'a ScopeFilter,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsResponse {
    List(Vec<Record>),
    Wrapped { results: Vec<Record> },
}

impl From<RecordsResponse> for SearchResult {
    fn from(response: RecordsResponse) -> Self {
        match response {
            RecordsResponse::List(records) | RecordsResponse::Wrapped { results: records } => {
                SearchResult::new(records)
            }
        }
    }
}

/// One entry of an add response. mem0 reports the extracted memories and
/// what it did with each (`ADD`, `UPDATE`, ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddedMemory {
    pub id: String,
    #[serde(default, alias = "memory")]
    pub text: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddResponse {
    List(Vec<AddedMemory>),
    Wrapped { results: Vec<AddedMemory> },
}

impl Mem0Client {
    /// Build a client from config. Requires an API key.
    pub fn new(config: &MemoryConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::invalid_config("mem0 API key is not set (MEM0_API_KEY)"))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {api_key}"))
            .map_err(|e| Error::invalid_config(format!("invalid mem0 API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Cap the number of records each search call asks for.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Store new memory content. mem0 extracts facts server-side, so one call
    /// may add, update, or skip several memories.
    pub async fn add(&self, content: &str, scope: &ScopeFilter) -> Result<Vec<AddedMemory>> {
        let body = AddRequest {
            messages: [Message {
                role: "user",
                content,
            }],
            scope,
        };
        let response = self.http.post(self.url("/v1/memories/")).json(&body).send().await?;
        let response = check_status("mem0 add", response).await?;
        let parsed: AddResponse = read_json(response).await?;

        Ok(match parsed {
            AddResponse::List(items) | AddResponse::Wrapped { results: items } => items,
        })
    }
}

impl MemoryStore for Mem0Client {
    async fn search(
        &self,
        query: &str,
        scope: &ScopeFilter,
        threshold: f64,
    ) -> Result<SearchResult> {
        let body = SearchRequest {
            query,
            threshold,
            top_k: self.top_k,
            scope,
        };
        let response = self
            .http
            .post(self.url("/v1/memories/search/"))
            .json(&body)
            .send()
            .await?;
        let response = check_status("mem0 search", response).await?;
        let parsed: RecordsResponse = read_json(response).await?;
        Ok(parsed.into())
    }

    async fn get_all(&self, scope: &ScopeFilter, limit: usize) -> Result<SearchResult> {
        let url = list_url(&self.url("/v1/memories/"), scope, limit)?;
        let response = self.http.get(url).send().await?;
        let response = check_status("mem0 get_all", response).await?;
        let parsed: RecordsResponse = read_json(response).await?;
        Ok(retain_in_scope(parsed.into(), scope, limit))
    }
}

/// The listing endpoint has no metadata filter, so metadata constraints are
/// applied to the page locally before `limit` is enforced.
fn retain_in_scope(mut result: SearchResult, scope: &ScopeFilter, limit: usize) -> SearchResult {
    result.records.retain(|r| scope.admits(r));
    result.records.truncate(limit);
    result
}

/// Build the bulk-listing URL. Metadata constraints are not expressible as
/// query parameters on this endpoint; see [`retain_in_scope`].
fn list_url(base: &str, scope: &ScopeFilter, limit: usize) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| Error::invalid_config(format!("invalid mem0 base URL: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(user_id) = &scope.user_id {
            pairs.append_pair("user_id", user_id);
        }
        if let Some(agent_id) = &scope.agent_id {
            pairs.append_pair("agent_id", agent_id);
        }
        if let Some(run_id) = &scope.run_id {
            pairs.append_pair("run_id", run_id);
        }
        pairs.append_pair("page_size", &limit.to_string());
    }
    Ok(url)
}

/// Decode a successful response body. A body of the wrong shape surfaces as
/// [`Error::Json`], separate from transport failures.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::remote(operation, format!("HTTP {status}: {body}")))
}
