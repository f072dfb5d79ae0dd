//! stats.nba.com client
//!
//! The stats endpoints reject requests that don't look like they came from
//! a browser on nba.com, so every request carries User-Agent, Referer and
//! Origin headers. Responses are cached by URL for `cache_ttl` and the
//! whole client sits behind an API circuit breaker.

use super::StatsProvider;
use crate::circuit_breaker::{ApiCircuitBreaker, ApiCircuitBreakerConfig, ApiCircuitState};
use crate::models::stat_table::{decode_game_log, decode_leaders, decode_players, decode_roster};
use crate::models::{GameRecord, LeaderRow, Player, RosterEntry, SeasonType, StatCategory, StatTable};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct NbaStatsConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub circuit_breaker: ApiCircuitBreakerConfig,
}

impl Default for NbaStatsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(3600),
            circuit_breaker: ApiCircuitBreakerConfig::default(),
        }
    }
}

/// Why a single request failed
#[derive(Debug, Error)]
enum FetchError {
    #[error("Failed to reach stats API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Stats API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to read stats API response: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Whether the failure says something about upstream health. A 4xx
    /// for one malformed query or a payload we can't parse does not.
    fn is_upstream_fault(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::Body(e) => !e.is_decode(),
        }
    }
}

/// stats.nba.com client with response caching
#[derive(Clone)]
pub struct NbaStatsClient {
    client: Client,
    base_url: String,
    /// Cache: url -> (body, fetched_at)
    cache: Arc<RwLock<HashMap<String, (Value, DateTime<Utc>)>>>,
    cache_ttl_secs: i64,
    circuit_breaker: Arc<ApiCircuitBreaker>,
}

impl std::fmt::Debug for NbaStatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NbaStatsClient")
            .field("base_url", &self.base_url)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers
}

impl NbaStatsClient {
    pub fn new(config: NbaStatsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(browser_headers())
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "NbaStatsClient initialized (base_url={}, timeout={:?}, cache_ttl={:?})",
            config.base_url, config.timeout, config.cache_ttl
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_secs: config.cache_ttl.as_secs() as i64,
            circuit_breaker: Arc::new(ApiCircuitBreaker::new("nba_stats", config.circuit_breaker)),
        })
    }

    pub fn circuit_state(&self) -> ApiCircuitState {
        self.circuit_breaker.state()
    }

    /// Build an endpoint URL with encoded query parameters
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/{}", self.base_url, endpoint);
        Url::parse_with_params(&base, params)
            .with_context(|| format!("Invalid stats URL for endpoint {}", endpoint))
    }

    async fn cached(&self, key: &str) -> Option<Value> {
        let cache = self.cache.read().await;
        let (body, fetched_at) = cache.get(key)?;
        let age = Utc::now().signed_duration_since(*fetched_at).num_seconds();
        if age < self.cache_ttl_secs {
            Some(body.clone())
        } else {
            None
        }
    }

    /// Insert a fresh response and drop everything past its TTL
    async fn store(&self, key: String, body: Value) {
        let now = Utc::now();
        let ttl = self.cache_ttl_secs;
        let mut cache = self.cache.write().await;
        cache.retain(|_, (_, fetched_at)| now.signed_duration_since(*fetched_at).num_seconds() < ttl);
        cache.insert(key, (body, now));
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// GET a stats endpoint, served from cache while fresh
    pub async fn get_json(&self, url: &Url) -> Result<Value> {
        let key = url.to_string();
        if let Some(body) = self.cached(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(body);
        }

        if !self.circuit_breaker.is_available() {
            let wait = self.circuit_breaker.retry_after().unwrap_or_default();
            return Err(anyhow!(
                "stats API circuit breaker is open ({}, retry in {}s)",
                url.path(),
                wait.as_secs()
            ));
        }

        match self.fetch(url).await {
            Ok(body) => {
                self.circuit_breaker.record_success();
                self.store(key, body.clone()).await;
                Ok(body)
            }
            Err(e) if e.is_upstream_fault() => {
                warn!("Stats API fault for {}: {}", url.path(), e);
                self.circuit_breaker.record_failure();
                Err(e.into())
            }
            Err(e) => {
                // upstream answered; the request or payload was the problem
                warn!("Stats request rejected for {}: {}", url.path(), e);
                self.circuit_breaker.record_success();
                Err(e.into())
            }
        }
    }

    async fn fetch(&self, url: &Url) -> std::result::Result<Value, FetchError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        response.json().await.map_err(FetchError::Body)
    }

    async fn table(&self, url: Url, name: &str) -> Result<StatTable> {
        let body = self.get_json(&url).await?;
        StatTable::extract(&body, name).with_context(|| format!("Unexpected {} payload", name))
    }
}

#[async_trait]
impl StatsProvider for NbaStatsClient {
    fn provider_name(&self) -> &str {
        "stats.nba.com"
    }

    async fn player_game_log(
        &self,
        player_id: i64,
        season: &str,
        season_type: SeasonType,
    ) -> Result<Vec<GameRecord>> {
        let id = player_id.to_string();
        let url = self.endpoint_url(
            "playergamelog",
            &[
                ("PlayerID", id.as_str()),
                ("Season", season),
                ("SeasonType", season_type.as_str()),
            ],
        )?;
        let table = self.table(url, "PlayerGameLog").await?;
        decode_game_log(&table)
            .with_context(|| format!("Bad game log row for player {} ({})", player_id, season))
    }

    async fn team_roster(&self, team_id: i64, season: &str) -> Result<Vec<RosterEntry>> {
        let id = team_id.to_string();
        let url = self.endpoint_url(
            "commonteamroster",
            &[("TeamID", id.as_str()), ("Season", season)],
        )?;
        let table = self.table(url, "CommonTeamRoster").await?;
        decode_roster(&table).with_context(|| format!("Bad roster row for team {}", team_id))
    }

    async fn league_leaders(
        &self,
        category: StatCategory,
        season: &str,
        season_type: SeasonType,
    ) -> Result<Vec<LeaderRow>> {
        let url = self.endpoint_url(
            "leagueleaders",
            &[
                ("LeagueID", "00"),
                ("PerMode", "PerGame"),
                ("Scope", "S"),
                ("Season", season),
                ("SeasonType", season_type.as_str()),
                ("StatCategory", category.as_str()),
            ],
        )?;
        let table = self.table(url, "LeagueLeaders").await?;
        decode_leaders(&table, category)
            .with_context(|| format!("Bad leaderboard row for {}", category.as_str()))
    }

    async fn all_players(&self, season: &str) -> Result<Vec<Player>> {
        let url = self.endpoint_url(
            "commonallplayers",
            &[
                ("LeagueID", "00"),
                ("Season", season),
                ("IsOnlyCurrentSeason", "0"),
            ],
        )?;
        let table = self.table(url, "CommonAllPlayers").await?;
        let players = decode_players(&table).context("Bad player table row")?;
        info!("Fetched {} players from {}", players.len(), self.provider_name());
        Ok(players)
    }
}
