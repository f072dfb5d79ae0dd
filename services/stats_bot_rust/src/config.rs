use anyhow::{anyhow, Context, Result};
use chrono::Local;
use courtside_rust_core::clients::nba_stats::DEFAULT_BASE_URL;
use courtside_rust_core::season::current_season;
use courtside_rust_core::{NbaStatsConfig, SeasonType};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub signal_api_base_url: String,
    pub signal_number: String,
    /// Empty means everyone may talk to the bot
    pub allowed_senders: Vec<String>,
    pub command_prefix: String,

    pub season: String,
    pub season_type: SeasonType,
    pub head_to_head_seasons: usize,

    pub stats_api_base_url: String,
    pub stats_timeout: Duration,
    pub stats_cache_ttl: Duration,
    pub players_cache_file: PathBuf,

    pub poll_interval: Duration,
    pub max_reply_chars: usize,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let signal_api_base_url = get("SIGNAL_API_BASE_URL")
            .unwrap_or_else(|| "http://signal-cli-rest-api:8080".to_string());

        let signal_number = get("SIGNAL_NUMBER")
            .context("SIGNAL_NUMBER must be set (international format, e.g. +15551234567)")?;

        let allowed_senders = get("SIGNAL_ALLOWED_SENDERS")
            .map(|raw| parse_csv(&raw))
            .unwrap_or_default();

        let command_prefix = get("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string());

        let season = get("NBA_SEASON").unwrap_or_else(|| current_season(Local::now().date_naive()));

        let season_type = match get("NBA_SEASON_TYPE") {
            Some(raw) => SeasonType::from_str(&raw).map_err(|e| {
                anyhow!("Invalid NBA_SEASON_TYPE: {e} (expected Regular Season|Playoffs|Pre Season|All Star)")
            })?,
            None => SeasonType::default(),
        };

        let head_to_head_seasons = parse_usize(get("HEAD_TO_HEAD_SEASONS"), "HEAD_TO_HEAD_SEASONS", 3)?;
        if head_to_head_seasons == 0 {
            return Err(anyhow!("HEAD_TO_HEAD_SEASONS must be at least 1"));
        }

        let stats_api_base_url =
            get("STATS_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let stats_timeout =
            Duration::from_secs(parse_u64(get("STATS_TIMEOUT_SECS"), "STATS_TIMEOUT_SECS", 10)?);
        let stats_cache_ttl = Duration::from_secs(parse_u64(
            get("STATS_CACHE_TTL_SECS"),
            "STATS_CACHE_TTL_SECS",
            3600,
        )?);
        let players_cache_file = PathBuf::from(
            get("PLAYERS_CACHE_FILE").unwrap_or_else(|| "players_cache.json".to_string()),
        );

        let poll_interval =
            Duration::from_millis(parse_u64(get("POLL_INTERVAL_MS"), "POLL_INTERVAL_MS", 1000)?);
        if poll_interval.is_zero() {
            return Err(anyhow!("POLL_INTERVAL_MS must be at least 1"));
        }
        let max_reply_chars = parse_usize(get("MAX_REPLY_CHARS"), "MAX_REPLY_CHARS", 2000)?;
        if max_reply_chars < 100 {
            return Err(anyhow!("MAX_REPLY_CHARS must be at least 100, got {max_reply_chars}"));
        }
        let log_file = get("LOG_FILE").map(PathBuf::from);

        Ok(Self {
            signal_api_base_url,
            signal_number,
            allowed_senders,
            command_prefix,
            season,
            season_type,
            head_to_head_seasons,
            stats_api_base_url,
            stats_timeout,
            stats_cache_ttl,
            players_cache_file,
            poll_interval,
            max_reply_chars,
            log_file,
        })
    }

    pub fn stats_client_config(&self) -> NbaStatsConfig {
        NbaStatsConfig {
            base_url: self.stats_api_base_url.clone(),
            timeout: self.stats_timeout,
            cache_ttl: self.stats_cache_ttl,
            ..NbaStatsConfig::default()
        }
    }

    pub fn is_sender_allowed(&self, sender: &str) -> bool {
        self.allowed_senders.is_empty() || self.allowed_senders.iter().any(|s| s == sender)
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_u64(raw: Option<String>, key: &str, default: u64) -> Result<u64> {
    match raw {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("Invalid {key}: {v} (expected integer)")),
        None => Ok(default),
    }
}

fn parse_usize(raw: Option<String>, key: &str, default: usize) -> Result<usize> {
    match raw {
        Some(v) => v
            .parse::<usize>()
            .with_context(|| format!("Invalid {key}: {v} (expected integer)")),
        None => Ok(default),
    }
}
