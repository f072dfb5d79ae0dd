//! Decoding of the stats API's `{headers, rowSet}` tables.
//!
//! Columns are looked up by name exactly once per table. Every row is then
//! turned into a typed struct, so nothing past this boundary touches raw
//! JSON or column names.

use super::{GameRecord, LeaderRow, Player, RosterEntry, StatCategory};
use crate::error::FormatError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One named result set from a stats API response
#[derive(Debug, Clone, Deserialize)]
pub struct StatTable {
    #[serde(default)]
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl StatTable {
    /// Pull a result set out of a response body.
    ///
    /// Most endpoints return `resultSets: [..]`, a few (league leaders)
    /// return a single `resultSet: {..}`. When `name` is not present the
    /// first table is used.
    pub fn extract(body: &Value, name: &str) -> Result<StatTable, FormatError> {
        if let Some(sets) = body.get("resultSets").and_then(|v| v.as_array()) {
            let chosen = sets
                .iter()
                .find(|s| s.get("name").and_then(|n| n.as_str()) == Some(name))
                .or_else(|| sets.first())
                .ok_or_else(|| FormatError::missing("resultSets[0]"))?;
            return serde_json::from_value(chosen.clone())
                .map_err(|_| FormatError::mismatch(name, "result set"));
        }

        if let Some(set) = body.get("resultSet") {
            return serde_json::from_value(set.clone())
                .map_err(|_| FormatError::mismatch(name, "result set"));
        }

        Err(FormatError::missing("resultSets"))
    }

    pub fn reader(&self) -> RowReader {
        RowReader::new(&self.headers)
    }

    pub fn is_empty(&self) -> bool {
        self.row_set.is_empty()
    }
}

/// Column-name -> index map for one table
#[derive(Debug, Clone)]
pub struct RowReader {
    columns: HashMap<String, usize>,
}

impl RowReader {
    pub fn new(headers: &[String]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_uppercase(), i))
            .collect();
        Self { columns }
    }

    fn cell<'a>(&self, row: &'a [Value], field: &str) -> Result<&'a Value, FormatError> {
        let idx = self
            .columns
            .get(&field.to_uppercase())
            .ok_or_else(|| FormatError::missing(field))?;
        row.get(*idx).ok_or_else(|| FormatError::missing(field))
    }

    pub fn i64(&self, row: &[Value], field: &str) -> Result<i64, FormatError> {
        let v = self.cell(row, field)?;
        if let Some(n) = v.as_i64() {
            return Ok(n);
        }
        match v.as_f64() {
            Some(f) if f.fract() == 0.0 => Ok(f as i64),
            _ => match v.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
                Some(n) => Ok(n),
                None => Err(FormatError::mismatch(field, "integer")),
            },
        }
    }

    pub fn u32(&self, row: &[Value], field: &str) -> Result<u32, FormatError> {
        let n = self.i64(row, field)?;
        u32::try_from(n).map_err(|_| FormatError::invalid(field, n))
    }

    pub fn f64(&self, row: &[Value], field: &str) -> Result<f64, FormatError> {
        self.opt_f64(row, field)?
            .ok_or_else(|| FormatError::mismatch(field, "number"))
    }

    /// `Ok(None)` for an explicit JSON null
    pub fn opt_f64(&self, row: &[Value], field: &str) -> Result<Option<f64>, FormatError> {
        let v = self.cell(row, field)?;
        if v.is_null() {
            return Ok(None);
        }
        v.as_f64()
            .map(Some)
            .ok_or_else(|| FormatError::mismatch(field, "number"))
    }

    pub fn string(&self, row: &[Value], field: &str) -> Result<String, FormatError> {
        self.opt_string(row, field)?
            .ok_or_else(|| FormatError::mismatch(field, "string"))
    }

    /// Strings, with numbers stringified (jersey numbers come both ways)
    pub fn opt_string(&self, row: &[Value], field: &str) -> Result<Option<String>, FormatError> {
        match self.cell(row, field)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.trim().to_string())),
            Value::Number(n) => Ok(Some(n.to_string())),
            _ => Err(FormatError::mismatch(field, "string")),
        }
    }

    pub fn date(&self, row: &[Value], field: &str) -> Result<NaiveDate, FormatError> {
        let raw = self.string(row, field)?;
        parse_game_date(&raw).ok_or_else(|| FormatError::invalid(field, raw))
    }
}

/// Game dates show up as "OCT 22, 2025", "2025-10-22T00:00:00" or "2025-10-22"
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()
}

/// Shooting percentage, derived from made/attempted when the API sends null
fn pct(
    reader: &RowReader,
    row: &[Value],
    field: &str,
    made: u32,
    attempted: u32,
) -> Result<f64, FormatError> {
    match reader.opt_f64(row, field)? {
        Some(p) => Ok(p),
        None if attempted == 0 => Ok(0.0),
        None => Ok(made as f64 / attempted as f64),
    }
}

// ============================================================================
// Table decoders
// ============================================================================

/// Decode a `PlayerGameLog` table. Row order is preserved (newest first).
pub fn decode_game_log(table: &StatTable) -> Result<Vec<GameRecord>, FormatError> {
    let r = table.reader();
    table
        .row_set
        .iter()
        .map(|row| {
            let fgm = r.u32(row, "FGM")?;
            let fga = r.u32(row, "FGA")?;
            let fg3m = r.u32(row, "FG3M")?;
            let fg3a = r.u32(row, "FG3A")?;
            let ftm = r.u32(row, "FTM")?;
            let fta = r.u32(row, "FTA")?;
            Ok(GameRecord {
                game_date: r.date(row, "GAME_DATE")?,
                matchup: r.string(row, "MATCHUP")?,
                win_loss: r.opt_string(row, "WL")?,
                pts: r.u32(row, "PTS")?,
                reb: r.u32(row, "REB")?,
                ast: r.u32(row, "AST")?,
                fgm,
                fga,
                fg_pct: pct(&r, row, "FG_PCT", fgm, fga)?,
                fg3m,
                fg3a,
                fg3_pct: pct(&r, row, "FG3_PCT", fg3m, fg3a)?,
                ftm,
                fta,
                ft_pct: pct(&r, row, "FT_PCT", ftm, fta)?,
            })
        })
        .collect()
}

/// Decode a `CommonTeamRoster` table
pub fn decode_roster(table: &StatTable) -> Result<Vec<RosterEntry>, FormatError> {
    let r = table.reader();
    table
        .row_set
        .iter()
        .map(|row| {
            Ok(RosterEntry {
                player_id: r.i64(row, "PLAYER_ID")?,
                number: r.opt_string(row, "NUM")?.unwrap_or_default(),
                name: r.string(row, "PLAYER")?,
                position: r.opt_string(row, "POSITION")?.unwrap_or_default(),
                age: r.f64(row, "AGE")?,
                height: r.opt_string(row, "HEIGHT")?.unwrap_or_default(),
                weight: r.opt_string(row, "WEIGHT")?.unwrap_or_default(),
            })
        })
        .collect()
}

/// Decode a `LeagueLeaders` table; `value` is read from the category's column
pub fn decode_leaders(
    table: &StatTable,
    category: StatCategory,
) -> Result<Vec<LeaderRow>, FormatError> {
    let r = table.reader();
    table
        .row_set
        .iter()
        .map(|row| {
            Ok(LeaderRow {
                rank: r.u32(row, "RANK")?,
                player_id: r.i64(row, "PLAYER_ID")?,
                player: r.string(row, "PLAYER")?,
                team: r.opt_string(row, "TEAM")?.unwrap_or_default(),
                games_played: r.u32(row, "GP")?,
                value: r.f64(row, category.as_str())?,
            })
        })
        .collect()
}

/// Decode a `CommonAllPlayers` table. `ROSTERSTATUS` 1 means active.
pub fn decode_players(table: &StatTable) -> Result<Vec<Player>, FormatError> {
    let r = table.reader();
    table
        .row_set
        .iter()
        .map(|row| {
            let status = r.opt_string(row, "ROSTERSTATUS")?.unwrap_or_default();
            Ok(Player {
                id: r.i64(row, "PERSON_ID")?,
                full_name: r.string(row, "DISPLAY_FIRST_LAST")?,
                is_active: status == "1",
            })
        })
        .collect()
}
