//! Command dispatch: parsed command -> lookups -> provider fetch -> report text.
//!
//! Every failure ends up as a short reply. Provider errors are logged with
//! full context and the user only sees a generic "unavailable" line.

use crate::commands::{help_text, parse_command, Command, UsageError};
use crate::config::Config;
use courtside_rust_core::models::GameRecord;
use courtside_rust_core::report;
use courtside_rust_core::resolver::{find_player, find_team};
use courtside_rust_core::season::previous_seasons;
use courtside_rust_core::{
    EntityKind, ReferenceData, SeasonType, StatCategory, StatsError, StatsProvider,
};
use futures_util::future::try_join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const UNAVAILABLE_REPLY: &str = "The stats service is unavailable right now. Try again later.";
pub const BAD_DATA_REPLY: &str = "The stats service sent data I couldn't read. Try again later.";

#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl From<courtside_rust_core::FormatError> for Failure {
    fn from(e: courtside_rust_core::FormatError) -> Self {
        Failure::Stats(StatsError::Format(e))
    }
}

type Outcome = std::result::Result<String, Failure>;

/// Reply text for a core error
pub fn stats_error_reply(err: &StatsError) -> String {
    match err {
        StatsError::NotFound {
            kind,
            query,
            suggestions,
        } => {
            let mut reply = format!("No {} found matching '{}'.", kind.as_str(), query);
            if !suggestions.is_empty() {
                reply.push_str(&format!(" Did you mean: {}?", suggestions.join(", ")));
            }
            if *kind == EntityKind::Player {
                reply.push_str(" Only active players are searchable.");
            }
            reply
        }
        StatsError::AmbiguousMatch { query, candidates } => format!(
            "'{}' matches several teams: {}. Be more specific.",
            query,
            candidates.join(", ")
        ),
        StatsError::InsufficientData {
            required,
            available,
        } => format!(
            "Not enough games yet: need {}, only {} played.",
            required, available
        ),
        StatsError::Format(_) => BAD_DATA_REPLY.to_string(),
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn StatsProvider>,
    reference: Arc<ReferenceData>,
    prefix: String,
    season: String,
    season_type: SeasonType,
    head_to_head_seasons: usize,
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn StatsProvider>,
        reference: Arc<ReferenceData>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            reference,
            prefix: config.command_prefix.clone(),
            season: config.season.clone(),
            season_type: config.season_type,
            head_to_head_seasons: config.head_to_head_seasons,
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    /// Reply for one incoming message, or `None` when it isn't a command
    pub async fn handle(&self, text: &str) -> Option<String> {
        let parsed = parse_command(&self.prefix, text)?;
        let outcome = match parsed {
            Ok(command) => {
                debug!("Dispatching {:?}", command);
                self.run(command).await
            }
            Err(usage) => Err(Failure::Usage(usage)),
        };

        Some(match outcome {
            Ok(reply) => reply,
            Err(Failure::Usage(usage)) => usage.to_string(),
            Err(Failure::Stats(err)) => {
                if let StatsError::Format(detail) = &err {
                    error!("Malformed stats data for '{}': {}", text.trim(), detail);
                }
                stats_error_reply(&err)
            }
            Err(Failure::Provider(err)) => {
                warn!(
                    "{} request failed for '{}': {:#}",
                    self.provider.provider_name(),
                    text.trim(),
                    err
                );
                UNAVAILABLE_REPLY.to_string()
            }
        })
    }

    async fn run(&self, command: Command) -> Outcome {
        match command {
            Command::Echo(text) => Ok(text),
            Command::Help => Ok(help_text(&self.prefix)),
            Command::GameLog { limit, player } => self.game_log(&player, limit).await,
            Command::HeadToHead { team, player } => self.head_to_head(&team, &player).await,
            Command::Averages { player } => self.averages(&player).await,
            Command::Form { player } => self.form(&player).await,
            Command::Leaders { stat, top } => self.leaders(stat, top).await,
            Command::Rank { stat, player } => self.rank(stat, &player).await,
            Command::Roster { team } => self.roster(&team).await,
        }
    }

    async fn season_log(&self, player_id: i64) -> Result<Vec<GameRecord>, Failure> {
        Ok(self
            .provider
            .player_game_log(player_id, &self.season, self.season_type)
            .await?)
    }

    async fn game_log(&self, query: &str, limit: i64) -> Outcome {
        let player = find_player(self.reference.players(), query)?;
        let records = self.season_log(player.id).await?;
        Ok(report::format_game_log(&player.full_name, &records, limit)?)
    }

    async fn head_to_head(&self, team_query: &str, player_query: &str) -> Outcome {
        let team = find_team(self.reference.teams(), team_query)?;
        let player = find_player(self.reference.players(), player_query)?;

        let seasons = previous_seasons(&self.season, self.head_to_head_seasons);
        let logs = try_join_all(seasons.iter().map(|season| {
            self.provider
                .player_game_log(player.id, season, self.season_type)
        }))
        .await?;
        let records: Vec<GameRecord> = logs.into_iter().flatten().collect();

        Ok(report::format_head_to_head(
            &player.full_name,
            team,
            &records,
            &team.abbreviation,
        )?)
    }

    async fn averages(&self, query: &str) -> Outcome {
        let player = find_player(self.reference.players(), query)?;
        let records = self.season_log(player.id).await?;
        Ok(report::format_season_averages(
            &player.full_name,
            &self.season,
            &records,
        )?)
    }

    async fn form(&self, query: &str) -> Outcome {
        let player = find_player(self.reference.players(), query)?;
        let records = self.season_log(player.id).await?;
        Ok(report::format_recent_form(&player.full_name, &records)?)
    }

    async fn leaders(&self, stat: StatCategory, top: usize) -> Outcome {
        let rows = self
            .provider
            .league_leaders(stat, &self.season, self.season_type)
            .await?;
        Ok(report::format_league_leaders(stat, &self.season, &rows, top)?)
    }

    async fn rank(&self, stat: StatCategory, query: &str) -> Outcome {
        let player = find_player(self.reference.players(), query)?;
        let rows = self
            .provider
            .league_leaders(stat, &self.season, self.season_type)
            .await?;
        Ok(report::format_player_rank(player, stat, &self.season, &rows)?)
    }

    async fn roster(&self, query: &str) -> Outcome {
        let team = find_team(self.reference.teams(), query)?;
        let roster = self.provider.team_roster(team.id, &self.season).await?;
        Ok(report::format_roster(&team.full_name, &roster)?)
    }
}
