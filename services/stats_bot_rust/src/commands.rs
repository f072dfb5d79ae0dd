//! Chat command parsing.
//!
//! `<prefix><name> <args>` becomes a [`Command`]. Anything that looks like a
//! command but can't be parsed becomes a [`UsageError`] whose message is sent
//! back to the user as-is.

use courtside_rust_core::StatCategory;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_GAME_LOG_LIMIT: i64 = 5;
pub const DEFAULT_LEADERS_TOP: usize = 10;
pub const MAX_LEADERS_TOP: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Echo(String),
    Help,
    GameLog { limit: i64, player: String },
    HeadToHead { team: String, player: String },
    Averages { player: String },
    Form { player: String },
    Leaders { stat: StatCategory, top: usize },
    Rank { stat: StatCategory, player: String },
    Roster { team: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

impl UsageError {
    fn usage(prefix: &str, syntax: &str) -> Self {
        UsageError(format!("Usage: {prefix}{syntax}"))
    }
}

pub fn help_text(prefix: &str) -> String {
    let lines = [
        format!("{prefix}gamelog [n] <player>  last n games (default {DEFAULT_GAME_LOG_LIMIT})"),
        format!("{prefix}vs <team> <player>  games against one team, recent seasons"),
        format!("{prefix}averages <player>  season averages"),
        format!("{prefix}form <player>  last 10 games vs season"),
        format!("{prefix}leaders <stat> [n]  league leaders (default {DEFAULT_LEADERS_TOP}, max {MAX_LEADERS_TOP})"),
        format!("{prefix}rank <stat> <player>  leaderboard position"),
        format!("{prefix}roster <team>  current roster"),
        format!("{prefix}echo <text>  repeat text"),
        "stats: pts reb ast stl blk fg% 3p% ft%".to_string(),
    ];
    lines.join("\n")
}

fn parse_stat(raw: &str) -> Result<StatCategory, UsageError> {
    StatCategory::from_str(raw).map_err(|_| {
        UsageError(format!(
            "Unknown stat '{raw}'. Try one of: pts reb ast stl blk fg% 3p% ft%"
        ))
    })
}

/// Parse one message. `None` means the message is not addressed to the bot.
pub fn parse_command(prefix: &str, text: &str) -> Option<Result<Command, UsageError>> {
    let body = text.trim().strip_prefix(prefix)?;
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(parse_args(prefix, &name.to_lowercase(), rest))
}

fn parse_args(prefix: &str, name: &str, rest: &str) -> Result<Command, UsageError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    match name {
        "echo" => {
            if rest.is_empty() {
                return Err(UsageError::usage(prefix, "echo <text>"));
            }
            Ok(Command::Echo(rest.to_string()))
        }
        "help" => Ok(Command::Help),
        "gamelog" => {
            let syntax = "gamelog [n] <player>";
            let (limit, player_tokens) = match tokens.split_first() {
                Some((first, others)) => match first.parse::<i64>() {
                    Ok(n) => (n, others),
                    Err(_) => (DEFAULT_GAME_LOG_LIMIT, &tokens[..]),
                },
                None => return Err(UsageError::usage(prefix, syntax)),
            };
            if player_tokens.is_empty() {
                return Err(UsageError::usage(prefix, syntax));
            }
            Ok(Command::GameLog {
                limit,
                player: player_tokens.join(" "),
            })
        }
        "vs" => match tokens.split_first() {
            Some((team, player)) if !player.is_empty() => Ok(Command::HeadToHead {
                team: team.to_string(),
                player: player.join(" "),
            }),
            _ => Err(UsageError::usage(prefix, "vs <team> <player>")),
        },
        "averages" | "avg" => {
            if tokens.is_empty() {
                return Err(UsageError::usage(prefix, "averages <player>"));
            }
            Ok(Command::Averages {
                player: tokens.join(" "),
            })
        }
        "form" => {
            if tokens.is_empty() {
                return Err(UsageError::usage(prefix, "form <player>"));
            }
            Ok(Command::Form {
                player: tokens.join(" "),
            })
        }
        "leaders" => {
            let syntax = "leaders <stat> [n]";
            let stat = match tokens.first() {
                Some(raw) => parse_stat(raw)?,
                None => return Err(UsageError::usage(prefix, syntax)),
            };
            let top = match tokens.get(1) {
                Some(raw) => raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=MAX_LEADERS_TOP).contains(n))
                    .ok_or_else(|| {
                        UsageError(format!("n must be between 1 and {MAX_LEADERS_TOP}"))
                    })?,
                None => DEFAULT_LEADERS_TOP,
            };
            if tokens.len() > 2 {
                return Err(UsageError::usage(prefix, syntax));
            }
            Ok(Command::Leaders { stat, top })
        }
        "rank" => match tokens.split_first() {
            Some((stat, player)) if !player.is_empty() => Ok(Command::Rank {
                stat: parse_stat(stat)?,
                player: player.join(" "),
            }),
            _ => Err(UsageError::usage(prefix, "rank <stat> <player>")),
        },
        "roster" => {
            if tokens.is_empty() {
                return Err(UsageError::usage(prefix, "roster <team>"));
            }
            Ok(Command::Roster {
                team: tokens.join(" "),
            })
        }
        other => Err(UsageError(format!(
            "Unknown command '{prefix}{other}'. Send {prefix}help for a list."
        ))),
    }
}
