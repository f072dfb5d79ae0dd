// Shared models for the Courtside bot
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod stat_table;

pub use stat_table::{RowReader, StatTable};

// ============================================================================
// Reference entities (loaded once, read-only)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub full_name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub full_name: String,
    pub abbreviation: String,
    pub nickname: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub year_founded: Option<i32>,
}

// ============================================================================
// Per-query stat rows
// ============================================================================

/// One game's box score line for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_date: NaiveDate,
    /// e.g. "LAL vs. BOS" (home) or "LAL @ BOS" (away)
    pub matchup: String,
    pub win_loss: Option<String>,
    pub pts: u32,
    pub reb: u32,
    pub ast: u32,
    pub fgm: u32,
    pub fga: u32,
    /// Ratio in 0.0..=1.0
    pub fg_pct: f64,
    pub fg3m: u32,
    pub fg3a: u32,
    pub fg3_pct: f64,
    pub ftm: u32,
    pub fta: u32,
    pub ft_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: i64,
    /// Jersey numbers are strings upstream ("00" and "0" are different numbers)
    pub number: String,
    pub name: String,
    pub position: String,
    /// Fractional years as reported by the API
    pub age: f64,
    pub height: String,
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderRow {
    pub rank: u32,
    pub player_id: i64,
    pub player: String,
    pub team: String,
    pub games_played: u32,
    pub value: f64,
}

// ============================================================================
// Derived aggregate
// ============================================================================

/// Arithmetic means over a subset of games. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeasonAggregate {
    pub games: usize,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub fg_pct: f64,
    pub fg3_pct: f64,
    pub ft_pct: f64,
}

impl SeasonAggregate {
    /// Mean of each field. An empty slice gives all zeros with `games == 0`.
    pub fn from_records(records: &[GameRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let n = records.len() as f64;
        let mean = |f: fn(&GameRecord) -> f64| records.iter().map(f).sum::<f64>() / n;

        Self {
            games: records.len(),
            pts: mean(|r| r.pts as f64),
            reb: mean(|r| r.reb as f64),
            ast: mean(|r| r.ast as f64),
            fg_pct: mean(|r| r.fg_pct),
            fg3_pct: mean(|r| r.fg3_pct),
            ft_pct: mean(|r| r.ft_pct),
        }
    }
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SeasonType {
    #[default]
    #[serde(rename = "Regular Season")]
    Regular,
    #[serde(rename = "Playoffs")]
    Playoffs,
    #[serde(rename = "Pre Season")]
    PreSeason,
    #[serde(rename = "All Star")]
    AllStar,
}

impl SeasonType {
    /// Value sent as the `SeasonType` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonType::Regular => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
            SeasonType::PreSeason => "Pre Season",
            SeasonType::AllStar => "All Star",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "regular" | "regular season" => Ok(SeasonType::Regular),
            "playoffs" | "playoff" | "postseason" => Ok(SeasonType::Playoffs),
            "pre season" | "preseason" => Ok(SeasonType::PreSeason),
            "all star" | "allstar" => Ok(SeasonType::AllStar),
            other => Err(format!("unknown season type: {other}")),
        }
    }
}

/// Stat a leaderboard can be ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatCategory {
    Pts,
    Reb,
    Ast,
    Stl,
    Blk,
    FgPct,
    Fg3Pct,
    FtPct,
}

impl StatCategory {
    pub const ALL: [StatCategory; 8] = [
        StatCategory::Pts,
        StatCategory::Reb,
        StatCategory::Ast,
        StatCategory::Stl,
        StatCategory::Blk,
        StatCategory::FgPct,
        StatCategory::Fg3Pct,
        StatCategory::FtPct,
    ];

    /// Column / `StatCategory` parameter name used by the stats API
    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Pts => "PTS",
            StatCategory::Reb => "REB",
            StatCategory::Ast => "AST",
            StatCategory::Stl => "STL",
            StatCategory::Blk => "BLK",
            StatCategory::FgPct => "FG_PCT",
            StatCategory::Fg3Pct => "FG3_PCT",
            StatCategory::FtPct => "FT_PCT",
        }
    }

    /// Short label for reply text
    pub fn label(&self) -> &'static str {
        match self {
            StatCategory::Pts => "PTS",
            StatCategory::Reb => "REB",
            StatCategory::Ast => "AST",
            StatCategory::Stl => "STL",
            StatCategory::Blk => "BLK",
            StatCategory::FgPct => "FG%",
            StatCategory::Fg3Pct => "3P%",
            StatCategory::FtPct => "FT%",
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            StatCategory::FgPct | StatCategory::Fg3Pct | StatCategory::FtPct
        )
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pts" | "points" | "scoring" => Ok(StatCategory::Pts),
            "reb" | "rebounds" | "boards" => Ok(StatCategory::Reb),
            "ast" | "assists" | "dimes" => Ok(StatCategory::Ast),
            "stl" | "steals" => Ok(StatCategory::Stl),
            "blk" | "blocks" => Ok(StatCategory::Blk),
            "fg" | "fg%" | "fg_pct" | "fgpct" => Ok(StatCategory::FgPct),
            "3p" | "3p%" | "3pt" | "fg3" | "fg3%" | "fg3_pct" | "threes" => {
                Ok(StatCategory::Fg3Pct)
            }
            "ft" | "ft%" | "ft_pct" | "ftpct" => Ok(StatCategory::FtPct),
            other => Err(format!("unknown stat: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pts: u32, fg_pct: f64) -> GameRecord {
        GameRecord {
            game_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            matchup: "LAL vs. BOS".to_string(),
            win_loss: Some("W".to_string()),
            pts,
            reb: 5,
            ast: 7,
            fgm: 10,
            fga: 20,
            fg_pct,
            fg3m: 2,
            fg3a: 5,
            fg3_pct: 0.4,
            ftm: 4,
            fta: 5,
            ft_pct: 0.8,
        }
    }

    #[test]
    fn test_aggregate_means() {
        let agg = SeasonAggregate::from_records(&[record(30, 0.5), record(20, 0.4)]);
        assert_eq!(agg.games, 2);
        assert!((agg.pts - 25.0).abs() < 1e-9);
        assert!((agg.fg_pct - 0.45).abs() < 1e-9);
        assert!((agg.reb - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_empty() {
        let agg = SeasonAggregate::from_records(&[]);
        assert_eq!(agg.games, 0);
        assert_eq!(agg.pts, 0.0);
    }

    #[test]
    fn test_season_type_parse() {
        assert_eq!("Regular Season".parse::<SeasonType>(), Ok(SeasonType::Regular));
        assert_eq!("playoffs".parse::<SeasonType>(), Ok(SeasonType::Playoffs));
        assert_eq!("pre-season".parse::<SeasonType>(), Ok(SeasonType::PreSeason));
        assert!("summer league".parse::<SeasonType>().is_err());
        assert_eq!(SeasonType::default().as_str(), "Regular Season");
    }

    #[test]
    fn test_stat_category_parse() {
        assert_eq!("points".parse::<StatCategory>(), Ok(StatCategory::Pts));
        assert_eq!("3P%".parse::<StatCategory>(), Ok(StatCategory::Fg3Pct));
        assert_eq!("AST".parse::<StatCategory>(), Ok(StatCategory::Ast));
        assert!("turnovers".parse::<StatCategory>().is_err());
        assert!(StatCategory::FtPct.is_percentage());
        assert!(!StatCategory::Blk.is_percentage());
    }
}
