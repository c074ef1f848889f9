//! HTTP client for the remote content service.
//!
//! Every call is bounded by the configured timeout and is attempted once.
//! A connect error, a timeout or a 5xx answer becomes an "unavailable"
//! error so callers can route players to a safe fallback instead of
//! retrying inside a request.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taleweaver_content::{
    Choice, ChoiceDraft, Node, NodeDraft, StoryDetail, StoryDraft, StorySummary,
};
use tracing::{debug, info, warn};
use url::Url;

use super::ContentSource;
use super::error::{ContentError, ContentResult};
use crate::build_info;
use crate::config::ContentConfig;

/// Header carrying the content API key.
const API_KEY_HEADER: &str = "x-api-key";

/// reqwest-backed [`ContentSource`].
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    base_url: Url,
    http: Client,
}

impl HttpContentClient {
    /// Build a client from explicit configuration.
    pub fn new(config: &ContentConfig) -> ContentResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ContentError::Config(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ContentError::Config(format!(
                "{} cannot be used as a base url",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ContentError::Config(format!("api key: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = Client::builder()
            .user_agent(build_info::user_agent())
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Ping the story listing once so a sleeping host starts booting.
    ///
    /// The outcome is only logged; nothing waits for the service to be ready.
    pub async fn wake_up(&self) {
        let Ok(url) = self.endpoint(&["api", "stories"]) else {
            return;
        };
        info!(url = %url, "Pinging content service to wake it up");
        match self.http.get(url).send().await {
            Ok(response) => {
                info!(status = response.status().as_u16(), "Content service answered")
            }
            Err(_) => info!("Wake-up signal sent, content service should be ready shortly"),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ContentResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ContentError::Config(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a single resource. 404 and other client errors mean "absent".
    async fn fetch_optional<T: DeserializeOwned>(&self, url: Url) -> ContentResult<Option<T>> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(Some(response.json().await?));
        }
        if status.is_server_error() {
            warn!(url = %url, status = status.as_u16(), "Content service unavailable");
            return Err(ContentError::Unavailable {
                status: status.as_u16(),
            });
        }

        debug!(url = %url, status = status.as_u16(), "Content resource not found");
        Ok(None)
    }

    /// GET a collection. Client errors yield an empty list.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> ContentResult<Vec<T>> {
        let response = self.http.get(url.clone()).query(query).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status.is_server_error() {
            warn!(url = %url, status = status.as_u16(), "Content service unavailable");
            return Err(ContentError::Unavailable {
                status: status.as_u16(),
            });
        }

        Ok(Vec::new())
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
        expected: StatusCode,
    ) -> ContentResult<T> {
        let response = self
            .http
            .request(method.clone(), url.clone())
            .json(body)
            .send()
            .await?;
        debug!(method = %method, url = %url, status = response.status().as_u16(), "Content write");

        if response.status() == expected {
            Ok(response.json().await?)
        } else {
            Err(self.write_error(response).await)
        }
    }

    async fn send_delete(&self, url: Url) -> ContentResult<()> {
        let response = self.http.delete(url.clone()).send().await?;
        debug!(url = %url, status = response.status().as_u16(), "Content delete");

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(self.write_error(response).await),
        }
    }

    async fn write_error(&self, response: Response) -> ContentError {
        let status = response.status();
        if status.is_server_error() {
            return ContentError::Unavailable {
                status: status.as_u16(),
            };
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Content write rejected");
        ContentError::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            },
        }
    }
}

#[async_trait]
impl ContentSource for HttpContentClient {
    async fn list_stories(&self, status: Option<&str>) -> ContentResult<Vec<StorySummary>> {
        let url = self.endpoint(&["api", "stories"])?;
        let query: Vec<(&str, &str)> = status.map(|s| ("status", s)).into_iter().collect();
        self.fetch_list(url, &query).await
    }

    async fn story_start(&self, story_id: &str) -> ContentResult<Option<Node>> {
        let url = self.endpoint(&["api", "stories", story_id, "start"])?;
        self.fetch_optional(url).await
    }

    async fn node(&self, story_id: &str, node_id: &str) -> ContentResult<Option<Node>> {
        let url = self.endpoint(&["api", "stories", story_id, "nodes", node_id])?;
        self.fetch_optional(url).await
    }

    async fn story_detail(&self, story_id: &str) -> ContentResult<Option<StoryDetail>> {
        let mut url = self.endpoint(&["api", "stories", story_id])?;
        // Cache busting: authors expect their latest edits in the graph view.
        url.query_pairs_mut()
            .append_pair("_t", &chrono::Utc::now().timestamp().to_string());
        self.fetch_optional(url).await
    }

    async fn story_nodes(&self, story_id: &str) -> ContentResult<Vec<Node>> {
        let url = self.endpoint(&["api", "stories", story_id, "nodes"])?;
        self.fetch_list(url, &[]).await
    }

    async fn create_story(&self, draft: &StoryDraft) -> ContentResult<StoryDetail> {
        let url = self.endpoint(&["api", "stories"])?;
        self.send_json(reqwest::Method::POST, url, draft, StatusCode::CREATED)
            .await
    }

    async fn update_story(&self, story_id: &str, draft: &StoryDraft) -> ContentResult<StoryDetail> {
        let url = self.endpoint(&["api", "stories", story_id])?;
        self.send_json(reqwest::Method::PUT, url, draft, StatusCode::OK)
            .await
    }

    async fn delete_story(&self, story_id: &str) -> ContentResult<()> {
        let url = self.endpoint(&["api", "stories", story_id])?;
        self.send_delete(url).await
    }

    async fn create_node(&self, story_id: &str, draft: &NodeDraft) -> ContentResult<Node> {
        let url = self.endpoint(&["api", "stories", story_id, "nodes"])?;
        self.send_json(reqwest::Method::POST, url, draft, StatusCode::CREATED)
            .await
    }

    async fn update_node(&self, node_id: &str, draft: &NodeDraft) -> ContentResult<Node> {
        let url = self.endpoint(&["api", "nodes", node_id])?;
        self.send_json(reqwest::Method::PUT, url, draft, StatusCode::OK)
            .await
    }

    async fn delete_node(&self, node_id: &str) -> ContentResult<()> {
        let url = self.endpoint(&["api", "nodes", node_id])?;
        self.send_delete(url).await
    }

    async fn create_choice(&self, node_id: &str, draft: &ChoiceDraft) -> ContentResult<Choice> {
        let url = self.endpoint(&["api", "nodes", node_id, "choices"])?;
        self.send_json(reqwest::Method::POST, url, draft, StatusCode::CREATED)
            .await
    }

    async fn update_choice(&self, choice_id: &str, draft: &ChoiceDraft) -> ContentResult<Choice> {
        let url = self.endpoint(&["api", "choices", choice_id])?;
        self.send_json(reqwest::Method::PUT, url, draft, StatusCode::OK)
            .await
    }

    async fn delete_choice(&self, choice_id: &str) -> ContentResult<()> {
        let url = self.endpoint(&["api", "choices", choice_id])?;
        self.send_delete(url).await
    }
}
