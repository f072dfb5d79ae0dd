//! Dispatcher integration tests
//!
//! Drives the full command path (parse -> resolve -> fetch -> format) with an
//! in-memory stats provider. No network access.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use courtside_rust_core::{
    GameRecord, LeaderRow, Player, ReferenceData, RosterEntry, SeasonType, StatCategory,
    StatsProvider,
};
use stats_bot_rust::dispatcher::{BAD_DATA_REPLY, UNAVAILABLE_REPLY};
use stats_bot_rust::{Config, Dispatcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn game(days_ago: i64, matchup: &str, pts: u32) -> GameRecord {
    GameRecord {
        game_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap() - Duration::days(days_ago),
        matchup: matchup.to_string(),
        win_loss: Some("W".to_string()),
        pts,
        reb: 7,
        ast: 8,
        fgm: 10,
        fga: 20,
        fg_pct: 0.5,
        fg3m: 2,
        fg3a: 5,
        fg3_pct: 0.4,
        ftm: 4,
        fta: 5,
        ft_pct: 0.8,
    }
}

#[derive(Default)]
struct FakeProvider {
    /// (player_id, season) -> log
    logs: HashMap<(i64, String), Vec<GameRecord>>,
    leaders: Vec<LeaderRow>,
    rosters: HashMap<i64, Vec<RosterEntry>>,
    fail: bool,
    requested_seasons: Mutex<Vec<String>>,
}

#[async_trait]
impl StatsProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn player_game_log(
        &self,
        player_id: i64,
        season: &str,
        _season_type: SeasonType,
    ) -> Result<Vec<GameRecord>> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        self.requested_seasons.lock().unwrap().push(season.to_string());
        Ok(self
            .logs
            .get(&(player_id, season.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn team_roster(&self, team_id: i64, _season: &str) -> Result<Vec<RosterEntry>> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.rosters.get(&team_id).cloned().unwrap_or_default())
    }

    async fn league_leaders(
        &self,
        _category: StatCategory,
        _season: &str,
        _season_type: SeasonType,
    ) -> Result<Vec<LeaderRow>> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.leaders.clone())
    }

    async fn all_players(&self, _season: &str) -> Result<Vec<Player>> {
        Ok(Vec::new())
    }
}

const LEBRON: i64 = 2544;
const JOKIC: i64 = 203999;
const CELTICS: i64 = 1610612738;

fn players() -> Vec<Player> {
    vec![
        Player { id: LEBRON, full_name: "LeBron James".into(), is_active: true },
        Player { id: JOKIC, full_name: "Nikola Jokić".into(), is_active: true },
        Player { id: 893, full_name: "Michael Jordan".into(), is_active: false },
    ]
}

fn config() -> Config {
    Config::from_lookup(|key| match key {
        "SIGNAL_NUMBER" => Some("+15550001111".to_string()),
        "NBA_SEASON" => Some("2025-26".to_string()),
        _ => None,
    })
    .unwrap()
}

fn fake() -> FakeProvider {
    let mut provider = FakeProvider::default();
    let current: Vec<GameRecord> = (0..12)
        .map(|i| {
            let matchup = if i == 3 { "LAL vs. BOS" } else { "LAL @ DEN" };
            game(i * 2, matchup, 20 + i as u32)
        })
        .collect();
    provider.logs.insert((LEBRON, "2025-26".into()), current);
    provider
        .logs
        .insert((LEBRON, "2024-25".into()), vec![game(400, "LAL @ BOS", 35)]);
    provider
        .logs
        .insert((JOKIC, "2025-26".into()), vec![game(1, "DEN vs. LAL", 30)]);

    provider.leaders = vec![
        LeaderRow {
            rank: 1,
            player_id: 1628983,
            player: "Shai Gilgeous-Alexander".into(),
            team: "OKC".into(),
            games_played: 70,
            value: 32.7,
        },
        LeaderRow {
            rank: 2,
            player_id: JOKIC,
            player: "Nikola Jokić".into(),
            team: "DEN".into(),
            games_played: 68,
            value: 29.6,
        },
    ];

    provider.rosters.insert(
        CELTICS,
        vec![RosterEntry {
            player_id: 1628369,
            number: "0".into(),
            name: "Jayson Tatum".into(),
            position: "F-G".into(),
            age: 27.4,
            height: "6-8".into(),
            weight: "210".into(),
        }],
    );
    provider
}

fn dispatcher_with(provider: FakeProvider) -> (Dispatcher, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let reference = Arc::new(ReferenceData::with_players(players()));
    let dispatcher = Dispatcher::new(provider.clone(), reference, &config());
    (dispatcher, provider)
}

fn dispatcher() -> Dispatcher {
    dispatcher_with(fake()).0
}

#[tokio::test]
async fn test_non_commands_are_ignored() {
    let d = dispatcher();
    assert_eq!(d.handle("good game last night").await, None);
}

#[tokio::test]
async fn test_echo_and_help() {
    let d = dispatcher();
    assert_eq!(d.handle("!echo hello").await.as_deref(), Some("hello"));
    let help = d.handle("!help").await.unwrap();
    assert!(help.contains("!gamelog"));
}

#[tokio::test]
async fn test_gamelog_default_limit() {
    let d = dispatcher();
    let reply = d.handle("!gamelog lebron james").await.unwrap();
    assert!(reply.starts_with("LeBron James: last 5 games\n"));
    assert_eq!(reply.lines().count(), 1 + 1 + 5 + 1);
    assert!(reply.ends_with("Averages (5 games): 22.0 PTS, 7.0 REB, 8.0 AST, 50.0% FG, 40.0% 3P"));
}

#[tokio::test]
async fn test_gamelog_large_limit_is_one_line() {
    let d = dispatcher();
    let reply = d.handle("!gamelog 20 lebron").await.unwrap();
    assert_eq!(reply.lines().count(), 1);
    assert!(reply.starts_with("LeBron James, last 12 games: "));
}

#[tokio::test]
async fn test_head_to_head_spans_seasons() {
    let (d, provider) = dispatcher_with(fake());
    let reply = d.handle("!vs celtics LeBron James").await.unwrap();
    assert!(reply.starts_with("LeBron James vs Boston Celtics: 2 games\n"));
    assert!(reply.ends_with("Averages (2 games): 29.0 PTS, 7.0 REB, 8.0 AST, 50.0% FG, 40.0% 3P"));

    let mut seasons = provider.requested_seasons.lock().unwrap().clone();
    seasons.sort();
    assert_eq!(seasons, vec!["2023-24", "2024-25", "2025-26"]);
}

#[tokio::test]
async fn test_head_to_head_no_games() {
    let d = dispatcher();
    let reply = d.handle("!vs MIA LeBron James").await.unwrap();
    assert!(reply.starts_with("LeBron James vs Miami Heat: 0 games\n"));
    assert!(reply.ends_with("Averages (0 games): -"));
}

#[tokio::test]
async fn test_ambiguous_team() {
    let d = dispatcher();
    let reply = d.handle("!roster los angeles").await.unwrap();
    assert!(reply.contains("matches several teams"));
    assert!(reply.contains("Los Angeles Lakers"));
}

#[tokio::test]
async fn test_unknown_and_inactive_player() {
    let d = dispatcher();
    let reply = d.handle("!averages lebron jmaes").await.unwrap();
    assert!(reply.starts_with("No player found matching 'lebron jmaes'. Did you mean: LeBron James?"));

    let reply = d.handle("!averages michael jordan").await.unwrap();
    assert!(reply.starts_with("No player found matching 'michael jordan'."));
}

#[tokio::test]
async fn test_averages_and_form() {
    let d = dispatcher();
    let reply = d.handle("!averages nikola jokic").await.unwrap();
    assert!(reply.starts_with("Nikola Jokić 2025-26 averages (1 game): 30.0 PTS"));

    let reply = d.handle("!form nikola jokic").await.unwrap();
    assert_eq!(reply, "Not enough games yet: need 10, only 1 played.");

    let reply = d.handle("!form lebron").await.unwrap();
    assert!(reply.starts_with("LeBron James: last 10 vs season (12 games)"));
}

#[tokio::test]
async fn test_leaders_and_rank() {
    let d = dispatcher();
    let reply = d.handle("!leaders pts 1").await.unwrap();
    assert!(reply.starts_with("2025-26 PTS leaders\n"));
    assert!(reply.contains("Shai Gilgeous-Alexander"));
    assert!(!reply.contains("Jokić"));

    let reply = d.handle("!rank pts jokic").await.unwrap();
    assert_eq!(
        reply,
        "Nikola Jokić ranks #2 of 2 in PTS for 2025-26 (29.6 over 68 games)"
    );

    let reply = d.handle("!rank pts lebron").await.unwrap();
    assert_eq!(reply, "LeBron James is not on the 2025-26 PTS leaderboard.");
}

#[tokio::test]
async fn test_roster() {
    let d = dispatcher();
    let reply = d.handle("!roster BOS").await.unwrap();
    assert!(reply.starts_with("Boston Celtics roster (1 players)\n"));
    assert!(reply.contains("Jayson Tatum"));
}

#[tokio::test]
async fn test_usage_errors_are_replies() {
    let d = dispatcher();
    assert_eq!(
        d.handle("!vs BOS").await.as_deref(),
        Some("Usage: !vs <team> <player>")
    );
    assert!(d.handle("!leaders pts 99").await.unwrap().contains("between 1 and 25"));
}

#[tokio::test]
async fn test_provider_failure_is_generic() {
    let provider = FakeProvider {
        fail: true,
        ..fake()
    };
    let (d, _) = dispatcher_with(provider);
    assert_eq!(d.handle("!gamelog lebron").await.as_deref(), Some(UNAVAILABLE_REPLY));
    assert_eq!(d.handle("!leaders reb").await.as_deref(), Some(UNAVAILABLE_REPLY));
    // resolution happens before any fetch
    assert!(d
        .handle("!roster seattle")
        .await
        .unwrap()
        .starts_with("No team found"));
}

#[tokio::test]
async fn test_malformed_rows_are_reported_safely() {
    let mut provider = fake();
    let mut bad = game(0, "LAL vs. BOS", 30);
    bad.fgm = 25;
    provider.logs.insert((LEBRON, "2025-26".into()), vec![bad]);
    let (d, _) = dispatcher_with(provider);
    assert_eq!(d.handle("!gamelog lebron").await.as_deref(), Some(BAD_DATA_REPLY));
}
