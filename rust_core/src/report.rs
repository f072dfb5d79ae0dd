//! Report assembly: typed stat rows -> fixed-width reply text.
//!
//! Every function here is pure and deterministic: the same input always
//! yields byte-identical output. Records arrive newest first and that order
//! is kept in every table.

use crate::error::{FormatError, StatsError, StatsResult};
use crate::models::{GameRecord, LeaderRow, Player, RosterEntry, SeasonAggregate, StatCategory, Team};

/// Above this many requested games the game log collapses to one line
pub const FULL_TABLE_MAX_GAMES: i64 = 15;

/// Games needed before a recent-form comparison means anything
pub const RECENT_FORM_GAMES: usize = 10;

/// Ratio to percent string with one fractional digit: 0.456 -> "45.6%"
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn games_label(n: usize) -> String {
    if n == 1 {
        "1 game".to_string()
    } else {
        format!("{n} games")
    }
}

// ============================================================================
// Validation
// ============================================================================

fn check_pct(field: &str, value: f64) -> Result<(), FormatError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FormatError::invalid(field, value))
    }
}

fn check_shots(field: &str, made: u32, attempted: u32) -> Result<(), FormatError> {
    if made <= attempted {
        Ok(())
    } else {
        Err(FormatError::invalid(field, format!("{made}-{attempted}")))
    }
}

fn validate_record(r: &GameRecord) -> Result<(), FormatError> {
    check_shots("FG", r.fgm, r.fga)?;
    check_shots("FG3", r.fg3m, r.fg3a)?;
    check_shots("FT", r.ftm, r.fta)?;
    check_pct("FG_PCT", r.fg_pct)?;
    check_pct("FG3_PCT", r.fg3_pct)?;
    check_pct("FT_PCT", r.ft_pct)?;
    if r.matchup.trim().is_empty() {
        return Err(FormatError::missing("MATCHUP"));
    }
    Ok(())
}

fn validate_records(records: &[GameRecord]) -> Result<(), FormatError> {
    records.iter().try_for_each(validate_record)
}

// ============================================================================
// Game tables
// ============================================================================

fn table_header() -> String {
    format!(
        "{:>10}{:>5}{:>5}{:>5}{:>7}{:>7}{:>7}{:>7}{:>7}{:>7}",
        "DATE", "PTS", "REB", "AST", "FG", "FG%", "3P", "3P%", "FT", "FT%"
    )
}

fn table_row(r: &GameRecord) -> String {
    format!(
        "{:>10}{:>5}{:>5}{:>5}{:>7}{:>7}{:>7}{:>7}{:>7}{:>7}",
        r.game_date.format("%Y-%m-%d").to_string(),
        r.pts,
        r.reb,
        r.ast,
        format!("{}-{}", r.fgm, r.fga),
        format_percent(r.fg_pct),
        format!("{}-{}", r.fg3m, r.fg3a),
        format_percent(r.fg3_pct),
        format!("{}-{}", r.ftm, r.fta),
        format_percent(r.ft_pct),
    )
}

/// "27.3 PTS, 7.1 REB, 8.0 AST, 51.2% FG, 38.0% 3P"
fn aggregate_text(agg: &SeasonAggregate) -> String {
    format!(
        "{:.1} PTS, {:.1} REB, {:.1} AST, {} FG, {} 3P",
        agg.pts,
        agg.reb,
        agg.ast,
        format_percent(agg.fg_pct),
        format_percent(agg.fg3_pct)
    )
}

fn summary_line(agg: &SeasonAggregate) -> String {
    if agg.games == 0 {
        format!("Averages ({}): -", games_label(0))
    } else {
        format!("Averages ({}): {}", games_label(agg.games), aggregate_text(agg))
    }
}

/// Title, column header, one row per record, summary line
fn render_table(title: &str, records: &[GameRecord]) -> String {
    let agg = SeasonAggregate::from_records(records);
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&table_header());
    out.push('\n');
    for r in records {
        out.push_str(&table_row(r));
        out.push('\n');
    }
    out.push_str(&summary_line(&agg));
    out
}

/// Last `limit` games for a player.
///
/// Requests above [`FULL_TABLE_MAX_GAMES`] get a single aggregate line
/// instead of a table. When fewer records exist than requested, the count
/// shown is the number actually used.
pub fn format_game_log(
    player_name: &str,
    records: &[GameRecord],
    limit: i64,
) -> Result<String, FormatError> {
    let take = if limit <= 0 {
        0
    } else {
        records.len().min(limit as usize)
    };
    let subset = &records[..take];
    validate_records(subset)?;

    if limit > FULL_TABLE_MAX_GAMES {
        let agg = SeasonAggregate::from_records(subset);
        return Ok(format!(
            "{}, last {}: {}",
            player_name,
            games_label(take),
            aggregate_text(&agg)
        ));
    }

    let title = format!("{}: last {}", player_name, games_label(take));
    Ok(render_table(&title, subset))
}

/// Every game in `records` played against `team_abbreviation`.
///
/// Opponents are recognised by substring match on the matchup string
/// ("LAL vs. BOS", "LAL @ BOS"). No row cap. With no matching games the
/// table has no data rows and the summary reads "0 games".
pub fn format_head_to_head(
    player_name: &str,
    team: &Team,
    records: &[GameRecord],
    team_abbreviation: &str,
) -> Result<String, FormatError> {
    if team_abbreviation.trim().is_empty() {
        return Err(FormatError::invalid("team_abbreviation", "''"));
    }

    let matched: Vec<GameRecord> = records
        .iter()
        .filter(|r| r.matchup.contains(team_abbreviation))
        .cloned()
        .collect();
    validate_records(&matched)?;

    let title = format!(
        "{} vs {}: {}",
        player_name,
        team.full_name,
        games_label(matched.len())
    );
    Ok(render_table(&title, &matched))
}

// ============================================================================
// Roster
// ============================================================================

fn age_years(entry: &RosterEntry) -> Result<u32, FormatError> {
    if !entry.age.is_finite() || entry.age < 0.0 {
        return Err(FormatError::invalid("AGE", entry.age));
    }
    // truncate: 24.9 years old is 24
    Ok(entry.age.trunc() as u32)
}

pub fn format_roster(team_name: &str, roster: &[RosterEntry]) -> Result<String, FormatError> {
    let mut out = String::new();
    out.push_str(&format!("{} roster ({} players)\n", team_name, roster.len()));
    out.push_str(&format!(
        "{:>3}  {:<26}{:<6}{:>4}  {:<6}{:>5}",
        "NO", "PLAYER", "POS", "AGE", "HT", "WT"
    ));

    for entry in roster {
        let age = age_years(entry)?;
        if entry.name.trim().is_empty() {
            return Err(FormatError::missing("PLAYER"));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>3}  {:<26}{:<6}{:>4}  {:<6}{:>5}",
            entry.number, entry.name, entry.position, age, entry.height, entry.weight
        ));
    }

    Ok(out)
}

// ============================================================================
// Season averages, form, rankings
// ============================================================================

pub fn format_season_averages(
    player_name: &str,
    season: &str,
    records: &[GameRecord],
) -> StatsResult<String> {
    if records.is_empty() {
        return Err(StatsError::insufficient(1, 0));
    }
    validate_records(records)?;

    let agg = SeasonAggregate::from_records(records);
    Ok(format!(
        "{} {} averages ({}): {}, {} FT",
        player_name,
        season,
        games_label(agg.games),
        aggregate_text(&agg),
        format_percent(agg.ft_pct)
    ))
}

/// Last ten games against everything in `records`, with signed deltas.
pub fn format_recent_form(player_name: &str, records: &[GameRecord]) -> StatsResult<String> {
    if records.len() < RECENT_FORM_GAMES {
        return Err(StatsError::insufficient(RECENT_FORM_GAMES, records.len()));
    }
    validate_records(records)?;

    let recent = SeasonAggregate::from_records(&records[..RECENT_FORM_GAMES]);
    let season = SeasonAggregate::from_records(records);

    let mut out = format!(
        "{}: last {} vs season ({})\n",
        player_name,
        RECENT_FORM_GAMES,
        games_label(season.games)
    );
    out.push_str(&format!("{:<5}{:>8}{:>8}{:>8}", "", "LAST10", "SEASON", "DIFF"));

    let counting = [
        ("PTS", recent.pts, season.pts),
        ("REB", recent.reb, season.reb),
        ("AST", recent.ast, season.ast),
    ];
    for (label, last, all) in counting {
        out.push_str(&format!(
            "\n{:<5}{:>8.1}{:>8.1}{:>8}",
            label,
            last,
            all,
            format!("{:+.1}", last - all)
        ));
    }

    let shooting = [
        ("FG%", recent.fg_pct, season.fg_pct),
        ("3P%", recent.fg3_pct, season.fg3_pct),
    ];
    for (label, last, all) in shooting {
        out.push_str(&format!(
            "\n{:<5}{:>8}{:>8}{:>8}",
            label,
            format_percent(last),
            format_percent(all),
            format!("{:+.1}", (last - all) * 100.0)
        ));
    }

    Ok(out)
}

fn format_stat_value(category: StatCategory, value: f64) -> String {
    if category.is_percentage() {
        format_percent(value)
    } else {
        format!("{value:.1}")
    }
}

/// Top `top` rows of a league leaderboard
pub fn format_league_leaders(
    category: StatCategory,
    season: &str,
    rows: &[LeaderRow],
    top: usize,
) -> Result<String, FormatError> {
    let mut out = format!("{} {} leaders", season, category.label());
    out.push('\n');
    out.push_str(&format!(
        "{:>4}  {:<26}{:<5}{:>4}{:>8}",
        "RANK",
        "PLAYER",
        "TEAM",
        "GP",
        category.label()
    ));

    for row in rows.iter().take(top) {
        if !row.value.is_finite() {
            return Err(FormatError::invalid(category.as_str(), row.value));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>4}  {:<26}{:<5}{:>4}{:>8}",
            row.rank,
            row.player,
            row.team,
            row.games_played,
            format_stat_value(category, row.value)
        ));
    }

    Ok(out)
}

/// Where one player sits on a leaderboard
pub fn format_player_rank(
    player: &Player,
    category: StatCategory,
    season: &str,
    rows: &[LeaderRow],
) -> Result<String, FormatError> {
    match rows.iter().find(|r| r.player_id == player.id) {
        Some(row) => {
            if !row.value.is_finite() {
                return Err(FormatError::invalid(category.as_str(), row.value));
            }
            Ok(format!(
                "{} ranks #{} of {} in {} for {} ({} over {})",
                player.full_name,
                row.rank,
                rows.len(),
                category.label(),
                season,
                format_stat_value(category, row.value),
                games_label(row.games_played as usize)
            ))
        }
        None => Ok(format!(
            "{} is not on the {} {} leaderboard.",
            player.full_name,
            season,
            category.label()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin_teams;
    use chrono::{Duration, NaiveDate};

    fn game(days_ago: i64, matchup: &str, pts: u32) -> GameRecord {
        GameRecord {
            game_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap() - Duration::days(days_ago),
            matchup: matchup.to_string(),
            win_loss: Some("W".to_string()),
            pts,
            reb: 8,
            ast: 6,
            fgm: 10,
            fga: 20,
            fg_pct: 0.5,
            fg3m: 2,
            fg3a: 5,
            fg3_pct: 0.4,
            ftm: 3,
            fta: 4,
            ft_pct: 0.75,
        }
    }

    fn season_log(n: usize) -> Vec<GameRecord> {
        (0..n)
            .map(|i| {
                let opp = if i % 3 == 0 { "LAL vs. DEN" } else { "LAL @ PHX" };
                game(i as i64 * 2, opp, if i % 2 == 0 { 30 } else { 28 })
            })
            .collect()
    }

    fn data_rows(text: &str) -> usize {
        text.lines().filter(|l| l.trim_start().starts_with("20")).count()
    }

    fn boston() -> Team {
        builtin_teams()
            .into_iter()
            .find(|t| t.abbreviation == "BOS")
            .unwrap()
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.456), "45.6%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_game_log_table() {
        let records = season_log(8);
        let out = format_game_log("LeBron James", &records, 5).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "LeBron James: last 5 games");
        assert_eq!(lines[1], table_header());
        assert_eq!(data_rows(&out), 5);
        // newest first
        assert!(lines[2].starts_with("2026-03-31"));
        assert!(lines[3].starts_with("2026-03-29"));
        assert_eq!(
            lines[2],
            "2026-03-31   30    8    6  10-20  50.0%    2-5  40.0%    3-4  75.0%"
        );
        assert_eq!(
            lines.last().copied(),
            Some("Averages (5 games): 29.2 PTS, 8.0 REB, 6.0 AST, 50.0% FG, 40.0% 3P")
        );
    }

    #[test]
    fn test_game_log_rows_share_width() {
        let out = format_game_log("X", &season_log(4), 4).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        let width = lines[1].len();
        for row in &lines[2..6] {
            assert_eq!(row.len(), width);
        }
    }

    #[test]
    fn test_game_log_limit_above_available() {
        let out = format_game_log("LeBron James", &season_log(3), 10).unwrap();
        assert!(out.starts_with("LeBron James: last 3 games\n"));
        assert_eq!(data_rows(&out), 3);
        assert!(out.ends_with("Averages (3 games): 29.3 PTS, 8.0 REB, 6.0 AST, 50.0% FG, 40.0% 3P"));
    }

    #[test]
    fn test_game_log_non_positive_limit() {
        for limit in [0, -3] {
            let out = format_game_log("LeBron James", &season_log(5), limit).unwrap();
            assert_eq!(data_rows(&out), 0);
            assert!(out.contains("0 games"));
            assert!(out.ends_with("Averages (0 games): -"));
        }
    }

    #[test]
    fn test_game_log_over_fifteen_is_single_line() {
        let records = season_log(20);
        let out = format_game_log("LeBron James", &records, 20).unwrap();
        assert!(!out.contains('\n'));
        assert_eq!(
            out,
            "LeBron James, last 20 games: 29.0 PTS, 8.0 REB, 6.0 AST, 50.0% FG, 40.0% 3P"
        );
    }

    #[test]
    fn test_game_log_over_fifteen_uses_effective_count() {
        let out = format_game_log("LeBron James", &season_log(12), 40).unwrap();
        assert!(out.starts_with("LeBron James, last 12 games:"));
    }

    #[test]
    fn test_game_log_rejects_bad_record() {
        let mut records = season_log(3);
        records[1].fgm = 25;
        let err = format_game_log("X", &records, 3).unwrap_err();
        assert_eq!(err, FormatError::invalid("FG", "25-20"));

        // rows outside the requested window are not inspected
        assert!(format_game_log("X", &records, 1).is_ok());
    }

    #[test]
    fn test_game_log_rejects_nan_percentage() {
        let mut records = season_log(2);
        records[0].fg3_pct = f64::NAN;
        assert!(matches!(
            format_game_log("X", &records, 2),
            Err(FormatError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_head_to_head_filters_by_matchup() {
        let mut records = season_log(6);
        records[1].matchup = "LAL vs. BOS".to_string();
        records[4].matchup = "LAL @ BOS".to_string();

        let out = format_head_to_head("LeBron James", &boston(), &records, "BOS").unwrap();
        assert!(out.starts_with("LeBron James vs Boston Celtics: 2 games\n"));
        assert_eq!(data_rows(&out), 2);
        assert!(out.ends_with("Averages (2 games): 29.0 PTS, 8.0 REB, 6.0 AST, 50.0% FG, 40.0% 3P"));
    }

    #[test]
    fn test_head_to_head_has_no_row_cap() {
        let records: Vec<GameRecord> = (0..25).map(|i| game(i, "LAL @ BOS", 20)).collect();
        let out = format_head_to_head("X", &boston(), &records, "BOS").unwrap();
        assert_eq!(data_rows(&out), 25);
    }

    #[test]
    fn test_head_to_head_without_matches_is_header_only() {
        let out = format_head_to_head("LeBron James", &boston(), &season_log(10), "BOS").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "LeBron James vs Boston Celtics: 0 games");
        assert_eq!(lines[1], table_header());
        assert_eq!(lines[2], "Averages (0 games): -");
    }

    #[test]
    fn test_head_to_head_empty_abbreviation() {
        assert!(format_head_to_head("X", &boston(), &season_log(2), " ").is_err());
    }

    fn roster() -> Vec<RosterEntry> {
        vec![
            RosterEntry {
                player_id: 1628369,
                number: "0".to_string(),
                name: "Jayson Tatum".to_string(),
                position: "F-G".to_string(),
                age: 27.9,
                height: "6-8".to_string(),
                weight: "210".to_string(),
            },
            RosterEntry {
                player_id: 1627759,
                number: "7".to_string(),
                name: "Jaylen Brown".to_string(),
                position: "G-F".to_string(),
                age: 29.0,
                height: "6-6".to_string(),
                weight: "223".to_string(),
            },
        ]
    }

    #[test]
    fn test_roster_truncates_age() {
        let out = format_roster("Boston Celtics", &roster()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Boston Celtics roster (2 players)");
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "  0  Jayson Tatum              F-G     27  6-8     210"
        );
        assert!(lines[3].contains("  29  "));
    }

    #[test]
    fn test_roster_is_idempotent() {
        let a = format_roster("Boston Celtics", &roster()).unwrap();
        let b = format_roster("Boston Celtics", &roster()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roster_rejects_bad_age() {
        let mut entries = roster();
        entries[1].age = -1.0;
        assert_eq!(
            format_roster("Boston Celtics", &entries).unwrap_err(),
            FormatError::invalid("AGE", -1.0)
        );
    }

    #[test]
    fn test_season_averages() {
        let out = format_season_averages("LeBron James", "2025-26", &season_log(4)).unwrap();
        assert_eq!(
            out,
            "LeBron James 2025-26 averages (4 games): 29.0 PTS, 8.0 REB, 6.0 AST, 50.0% FG, 40.0% 3P, 75.0% FT"
        );
        assert_eq!(
            format_season_averages("LeBron James", "2025-26", &[]).unwrap_err(),
            StatsError::insufficient(1, 0)
        );
    }

    #[test]
    fn test_recent_form_needs_ten_games() {
        assert_eq!(
            format_recent_form("X", &season_log(9)).unwrap_err(),
            StatsError::insufficient(10, 9)
        );
    }

    #[test]
    fn test_recent_form_deltas() {
        let mut records = season_log(20);
        for r in records.iter_mut().take(10) {
            r.pts = 35;
        }
        let out = format_recent_form("LeBron James", &records).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "LeBron James: last 10 vs season (20 games)");
        // season mean = (10 * 35 + 5 * 30 + 5 * 28) / 20 = 32.0
        assert_eq!(lines[2], "PTS      35.0    32.0    +3.0");
        assert!(lines[5].starts_with("FG%"));
        assert!(lines[5].ends_with("+0.0"));
    }

    fn leaders() -> Vec<LeaderRow> {
        vec![
            LeaderRow {
                rank: 1,
                player_id: 1628983,
                player: "Shai Gilgeous-Alexander".to_string(),
                team: "OKC".to_string(),
                games_played: 76,
                value: 32.7,
            },
            LeaderRow {
                rank: 2,
                player_id: 203507,
                player: "Giannis Antetokounmpo".to_string(),
                team: "MIL".to_string(),
                games_played: 67,
                value: 30.4,
            },
        ]
    }

    #[test]
    fn test_league_leaders_table() {
        let out = format_league_leaders(StatCategory::Pts, "2024-25", &leaders(), 1).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "2024-25 PTS leaders");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Shai Gilgeous-Alexander"));
        assert!(lines[2].ends_with("32.7"));
    }

    #[test]
    fn test_league_leaders_percentage_column() {
        let mut rows = leaders();
        rows[0].value = 0.512;
        let out = format_league_leaders(StatCategory::FgPct, "2024-25", &rows, 5).unwrap();
        assert!(out.contains("51.2%"));
    }

    #[test]
    fn test_player_rank() {
        let giannis = Player {
            id: 203507,
            full_name: "Giannis Antetokounmpo".to_string(),
            is_active: true,
        };
        let out = format_player_rank(&giannis, StatCategory::Pts, "2024-25", &leaders()).unwrap();
        assert_eq!(
            out,
            "Giannis Antetokounmpo ranks #2 of 2 in PTS for 2024-25 (30.4 over 67 games)"
        );

        let nobody = Player {
            id: 1,
            full_name: "Nobody".to_string(),
            is_active: true,
        };
        let out = format_player_rank(&nobody, StatCategory::Pts, "2024-25", &leaders()).unwrap();
        assert_eq!(out, "Nobody is not on the 2024-25 PTS leaderboard.");
    }
}
