// HTTP client for the balldontlie statistics API.
//
// Requests are `GET {base_url}/{resource}` with array-style filters
// (`player_ids[]`, `seasons[]`, ...), `per_page` and an opaque `cursor`.
// Listings are followed page by page until the server stops returning a
// `next_cursor` or the configured page cap is reached.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use hoopcast_core::config::{ApiConfig, Config};

use crate::source::StatsSource;
use crate::types::{Cursor, Page, Player, RawGame, RawStat, Team};
use crate::{ApiError, ApiResult};

type Query = Vec<(&'static str, String)>;

// ---------------------------------------------------------------------------
// BallDontLieClient
// ---------------------------------------------------------------------------

pub struct BallDontLieClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    per_page: u32,
    max_pages: u32,
}

impl BallDontLieClient {
    /// Build a client with the configured timeout. A missing key is allowed;
    /// the server will reject the requests and callers degrade to empty.
    pub fn new(api: &ApiConfig, api_key: Option<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("hoopcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Build { source })?;
        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            per_page: api.per_page,
            max_pages: api.max_pages,
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(&config.api, config.credentials.api_key.clone())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    /// Fetch one page of `resource`.
    async fn get_page(
        &self,
        resource: &str,
        query: &Query,
        cursor: Option<&Cursor>,
    ) -> ApiResult<Page<Value>> {
        let url = self.url(resource);
        let mut request = self
            .http
            .get(&url)
            .query(query)
            .query(&[("per_page", self.per_page.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor.as_str())]);
        }
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, key);
        }

        let response = request.send().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Request {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }

    /// Follow cursors through every page of `resource`.
    async fn paginate<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: Query,
    ) -> ApiResult<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<Cursor> = None;
        let mut pages = 0u32;

        loop {
            let page = self.get_page(resource, &query, cursor.as_ref()).await?;
            pages += 1;
            let next = page.next_cursor().cloned();
            items.extend(decode_items::<T>(page.data, resource));
            debug!(resource, pages, items = items.len(), cursor = ?next, "fetched page");

            match next {
                None => break,
                Some(c) if Some(&c) == cursor.as_ref() => {
                    warn!(resource, cursor = %c, "cursor did not advance; stopping");
                    break;
                }
                Some(_) if pages >= self.max_pages => {
                    warn!(resource, pages, "page cap reached; returning partial listing");
                    break;
                }
                Some(c) => cursor = Some(c),
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl StatsSource for BallDontLieClient {
    async fn search_players(&self, search: &str) -> ApiResult<Vec<Player>> {
        let query = vec![("search", search.trim().to_string())];
        let page = self.get_page("players/active", &query, None).await?;
        Ok(decode_items(page.data, "players/active"))
    }

    async fn teams(&self) -> ApiResult<Vec<Team>> {
        self.paginate("teams", Vec::new()).await
    }

    async fn season_stats(&self, player_id: u64, season: i32) -> ApiResult<Vec<RawStat>> {
        let query = vec![
            ("player_ids[]", player_id.to_string()),
            ("seasons[]", season.to_string()),
        ];
        self.paginate("stats", query).await
    }

    async fn season_games(&self, season: i32, team_id: u64) -> ApiResult<Vec<RawGame>> {
        let query = vec![
            ("seasons[]", season.to_string()),
            ("team_ids[]", team_id.to_string()),
        ];
        self.paginate("games", query).await
    }

    async fn game_stats(&self, player_id: u64, game_id: u64) -> ApiResult<Vec<RawStat>> {
        let query = vec![
            ("player_ids[]", player_id.to_string()),
            ("game_ids[]", game_id.to_string()),
        ];
        self.paginate("stats", query).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode each element on its own so one malformed record only costs itself.
pub(crate) fn decode_items<T: DeserializeOwned>(values: Vec<Value>, resource: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<T>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(resource, "skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}
