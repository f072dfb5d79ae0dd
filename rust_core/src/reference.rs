//! Static reference tables: players and teams.
//!
//! This module provides:
//! - The bundled table of NBA franchises
//! - Player table JSON persistence (load once, save after a fresh fetch)
//! - `ReferenceData`, built once at startup and shared read-only

use crate::models::{Player, Team};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Row of the bundled franchise table
struct TeamSeed {
    id: i64,
    abbreviation: &'static str,
    full_name: &'static str,
    nickname: &'static str,
    city: &'static str,
    state: &'static str,
    year_founded: i32,
}

static NBA_TEAMS: &[TeamSeed] = &[
    TeamSeed { id: 1610612737, abbreviation: "ATL", full_name: "Atlanta Hawks", nickname: "Hawks", city: "Atlanta", state: "Georgia", year_founded: 1949 },
    TeamSeed { id: 1610612738, abbreviation: "BOS", full_name: "Boston Celtics", nickname: "Celtics", city: "Boston", state: "Massachusetts", year_founded: 1946 },
    TeamSeed { id: 1610612739, abbreviation: "CLE", full_name: "Cleveland Cavaliers", nickname: "Cavaliers", city: "Cleveland", state: "Ohio", year_founded: 1970 },
    TeamSeed { id: 1610612740, abbreviation: "NOP", full_name: "New Orleans Pelicans", nickname: "Pelicans", city: "New Orleans", state: "Louisiana", year_founded: 2002 },
    TeamSeed { id: 1610612741, abbreviation: "CHI", full_name: "Chicago Bulls", nickname: "Bulls", city: "Chicago", state: "Illinois", year_founded: 1966 },
    TeamSeed { id: 1610612742, abbreviation: "DAL", full_name: "Dallas Mavericks", nickname: "Mavericks", city: "Dallas", state: "Texas", year_founded: 1980 },
    TeamSeed { id: 1610612743, abbreviation: "DEN", full_name: "Denver Nuggets", nickname: "Nuggets", city: "Denver", state: "Colorado", year_founded: 1976 },
    TeamSeed { id: 1610612744, abbreviation: "GSW", full_name: "Golden State Warriors", nickname: "Warriors", city: "Golden State", state: "California", year_founded: 1946 },
    TeamSeed { id: 1610612745, abbreviation: "HOU", full_name: "Houston Rockets", nickname: "Rockets", city: "Houston", state: "Texas", year_founded: 1967 },
    TeamSeed { id: 1610612746, abbreviation: "LAC", full_name: "Los Angeles Clippers", nickname: "Clippers", city: "Los Angeles", state: "California", year_founded: 1970 },
    TeamSeed { id: 1610612747, abbreviation: "LAL", full_name: "Los Angeles Lakers", nickname: "Lakers", city: "Los Angeles", state: "California", year_founded: 1948 },
    TeamSeed { id: 1610612748, abbreviation: "MIA", full_name: "Miami Heat", nickname: "Heat", city: "Miami", state: "Florida", year_founded: 1988 },
    TeamSeed { id: 1610612749, abbreviation: "MIL", full_name: "Milwaukee Bucks", nickname: "Bucks", city: "Milwaukee", state: "Wisconsin", year_founded: 1968 },
    TeamSeed { id: 1610612750, abbreviation: "MIN", full_name: "Minnesota Timberwolves", nickname: "Timberwolves", city: "Minnesota", state: "Minnesota", year_founded: 1989 },
    TeamSeed { id: 1610612751, abbreviation: "BKN", full_name: "Brooklyn Nets", nickname: "Nets", city: "Brooklyn", state: "New York", year_founded: 1976 },
    TeamSeed { id: 1610612752, abbreviation: "NYK", full_name: "New York Knicks", nickname: "Knicks", city: "New York", state: "New York", year_founded: 1946 },
    TeamSeed { id: 1610612753, abbreviation: "ORL", full_name: "Orlando Magic", nickname: "Magic", city: "Orlando", state: "Florida", year_founded: 1989 },
    TeamSeed { id: 1610612754, abbreviation: "IND", full_name: "Indiana Pacers", nickname: "Pacers", city: "Indianapolis", state: "Indiana", year_founded: 1976 },
    TeamSeed { id: 1610612755, abbreviation: "PHI", full_name: "Philadelphia 76ers", nickname: "76ers", city: "Philadelphia", state: "Pennsylvania", year_founded: 1949 },
    TeamSeed { id: 1610612756, abbreviation: "PHX", full_name: "Phoenix Suns", nickname: "Suns", city: "Phoenix", state: "Arizona", year_founded: 1968 },
    TeamSeed { id: 1610612757, abbreviation: "POR", full_name: "Portland Trail Blazers", nickname: "Trail Blazers", city: "Portland", state: "Oregon", year_founded: 1970 },
    TeamSeed { id: 1610612758, abbreviation: "SAC", full_name: "Sacramento Kings", nickname: "Kings", city: "Sacramento", state: "California", year_founded: 1948 },
    TeamSeed { id: 1610612759, abbreviation: "SAS", full_name: "San Antonio Spurs", nickname: "Spurs", city: "San Antonio", state: "Texas", year_founded: 1976 },
    TeamSeed { id: 1610612760, abbreviation: "OKC", full_name: "Oklahoma City Thunder", nickname: "Thunder", city: "Oklahoma City", state: "Oklahoma", year_founded: 1967 },
    TeamSeed { id: 1610612761, abbreviation: "TOR", full_name: "Toronto Raptors", nickname: "Raptors", city: "Toronto", state: "Ontario", year_founded: 1995 },
    TeamSeed { id: 1610612762, abbreviation: "UTA", full_name: "Utah Jazz", nickname: "Jazz", city: "Salt Lake City", state: "Utah", year_founded: 1974 },
    TeamSeed { id: 1610612763, abbreviation: "MEM", full_name: "Memphis Grizzlies", nickname: "Grizzlies", city: "Memphis", state: "Tennessee", year_founded: 1995 },
    TeamSeed { id: 1610612764, abbreviation: "WAS", full_name: "Washington Wizards", nickname: "Wizards", city: "Washington", state: "District of Columbia", year_founded: 1961 },
    TeamSeed { id: 1610612765, abbreviation: "DET", full_name: "Detroit Pistons", nickname: "Pistons", city: "Detroit", state: "Michigan", year_founded: 1948 },
    TeamSeed { id: 1610612766, abbreviation: "CHA", full_name: "Charlotte Hornets", nickname: "Hornets", city: "Charlotte", state: "North Carolina", year_founded: 1988 },
];

/// The 30 current NBA franchises, in franchise-id order
pub fn builtin_teams() -> Vec<Team> {
    NBA_TEAMS
        .iter()
        .map(|t| Team {
            id: t.id,
            full_name: t.full_name.to_string(),
            abbreviation: t.abbreviation.to_string(),
            nickname: t.nickname.to_string(),
            city: t.city.to_string(),
            state: t.state.to_string(),
            year_founded: Some(t.year_founded),
        })
        .collect()
}

/// Load a player table from a JSON file (`[{id, full_name, is_active}, ..]`).
///
/// Returns `Ok(None)` when the file does not exist so the caller can fall
/// back to fetching.
pub fn load_players(path: &Path) -> Result<Option<Vec<Player>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read player cache {}", path.display()))?;
    let players: Vec<Player> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid player cache {}", path.display()))?;
    Ok(Some(players))
}

/// Save a player table as pretty JSON
pub fn save_players(path: &Path, players: &[Player]) -> Result<()> {
    let content = serde_json::to_string_pretty(players)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write player cache {}", path.display()))
}

/// Reference tables for one process lifetime. Wrap in `Arc` and share.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    players: Vec<Player>,
    teams: Vec<Team>,
}

impl ReferenceData {
    pub fn new(players: Vec<Player>, teams: Vec<Team>) -> Self {
        Self { players, teams }
    }

    /// Builtin teams plus the given player table
    pub fn with_players(players: Vec<Player>) -> Self {
        Self::new(players, builtin_teams())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn active_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    pub fn team_by_abbreviation(&self, abbreviation: &str) -> Option<&Team> {
        self.teams
            .iter()
            .find(|t| t.abbreviation.eq_ignore_ascii_case(abbreviation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_teams_unique() {
        let teams = builtin_teams();
        assert_eq!(teams.len(), 30);

        let abbrs: HashSet<&str> = teams.iter().map(|t| t.abbreviation.as_str()).collect();
        assert_eq!(abbrs.len(), 30);
        let ids: HashSet<i64> = teams.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn test_player_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");

        assert!(load_players(&path).unwrap().is_none());

        let players = vec![Player {
            id: 2544,
            full_name: "LeBron James".to_string(),
            is_active: true,
        }];
        save_players(&path, &players).unwrap();
        assert_eq!(load_players(&path).unwrap(), Some(players));
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_players(&path).is_err());
    }

    #[test]
    fn test_reference_data_lookups() {
        let data = ReferenceData::with_players(vec![
            Player { id: 1, full_name: "A".into(), is_active: true },
            Player { id: 2, full_name: "B".into(), is_active: false },
        ]);
        assert_eq!(data.active_player_count(), 1);
        assert_eq!(data.team_by_abbreviation("bos").map(|t| t.id), Some(1610612738));
        assert!(data.team_by_abbreviation("SEA").is_none());
    }
}
