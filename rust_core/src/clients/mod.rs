pub mod nba_stats;

pub use nba_stats::{NbaStatsClient, NbaStatsConfig};

use crate::models::{GameRecord, LeaderRow, Player, RosterEntry, SeasonType, StatCategory};
use anyhow::Result;
use async_trait::async_trait;

/// Source of stat tables for the bot.
///
/// Implementations must be Send + Sync: the bot shares one provider across
/// every spawned message task. Rows come back already typed; anything that
/// fails to decode is an error, never a partially filled row.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Display name used in logs ("stats.nba.com")
    fn provider_name(&self) -> &str;

    /// Every game a player logged in one season, newest first
    async fn player_game_log(
        &self,
        player_id: i64,
        season: &str,
        season_type: SeasonType,
    ) -> Result<Vec<GameRecord>>;

    /// Current roster of a team for a season
    async fn team_roster(&self, team_id: i64, season: &str) -> Result<Vec<RosterEntry>>;

    /// Per-game leaderboard for one category, rank ascending
    async fn league_leaders(
        &self,
        category: StatCategory,
        season: &str,
        season_type: SeasonType,
    ) -> Result<Vec<LeaderRow>>;

    /// Full historical player table with active flags
    async fn all_players(&self, season: &str) -> Result<Vec<Player>>;
}
