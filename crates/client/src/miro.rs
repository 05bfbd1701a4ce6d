//! HTTP client for the Miro REST API (v2)

use crate::{ClientError, Result};
use boardflow_core::BoardSnapshot;
use indexmap::IndexSet;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

const DEFAULT_API_URL: &str = "https://api.miro.com/v2";
const DEFAULT_PAGE_SIZE: usize = 50;

/// Maximum number of body bytes kept in a status error
const ERROR_BODY_LIMIT: usize = 500;

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Client for one Miro account token
#[derive(Clone)]
pub struct MiroClient {
    client: Client,
    base_url: String,
    token: String,
    page_size: usize,
}

impl MiroClient {
    /// Create a client against the public API
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Configure from `MIRO_API_KEY` and (optionally) `MIRO_API_URL`
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("MIRO_API_KEY")
            .map_err(|_| ClientError::Config("MIRO_API_KEY is not set".into()))?;
        Ok(Self::new(token).with_base_url(env_or_default("MIRO_API_URL", DEFAULT_API_URL)))
    }

    /// Builder: point at a different API root
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: records requested per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every item on a board
    pub async fn fetch_items(&self, board_id: &str) -> Result<Vec<Value>> {
        self.fetch_all_paginated(&format!("/boards/{}/items", board_id))
            .await
    }

    /// Fetch every connector on a board
    pub async fn fetch_connectors(&self, board_id: &str) -> Result<Vec<Value>> {
        self.fetch_all_paginated(&format!("/boards/{}/connectors", board_id))
            .await
    }

    /// Fetch items and connectors into a snapshot
    #[instrument(skip(self))]
    pub async fn fetch_board(&self, board_id: &str) -> Result<BoardSnapshot> {
        if board_id.trim().is_empty() {
            return Err(ClientError::Config("board id is empty".into()));
        }

        info!("Fetching all board items...");
        let items = self.fetch_items(board_id).await?;

        info!("Fetching all connectors...");
        let connectors = self.fetch_connectors(board_id).await?;

        info!(
            "Fetched {} items and {} connectors",
            items.len(),
            connectors.len()
        );

        Ok(BoardSnapshot {
            items,
            connectors,
            board_id: Some(board_id.to_string()),
        })
    }

    /// Follow `links.next` until the collection is exhausted
    #[instrument(skip(self))]
    async fn fetch_all_paginated(&self, path: &str) -> Result<Vec<Value>> {
        let endpoint = format!("{}{}", self.base_url, path);
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = IndexSet::new();

        loop {
            let page = self.fetch_page(&endpoint, cursor.as_deref()).await?;
            debug!("Received {} records from {}", page.data.len(), endpoint);
            all.extend(page.data);

            let next = match page.links.and_then(|l| l.next) {
                Some(next) => next,
                None => break,
            };

            match cursor_from_next(&next) {
                Some(c) if seen.insert(c.clone()) => cursor = Some(c),
                Some(c) => {
                    debug!("Cursor {} repeated after {} pages, stopping", c, seen.len());
                    break;
                }
                None => break,
            }
        }

        Ok(all)
    }

    async fn fetch_page(&self, endpoint: &str, cursor: Option<&str>) -> Result<Page> {
        let mut query = vec![("limit", self.page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let request_error = |source: reqwest::Error| ClientError::Request {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .client
            .get(endpoint)
            .query(&query)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Extract the `cursor` query parameter from a `links.next` URL
pub fn cursor_from_next(next: &str) -> Option<String> {
    if let Ok(url) = Url::parse(next) {
        return url
            .query_pairs()
            .find(|(k, _)| k == "cursor")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty());
    }

    // Relative links
    next.split_once("cursor=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or(rest).to_string())
        .filter(|v| !v.is_empty())
}

// ==========================================
// RESPONSE TYPES
// ==========================================

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}
