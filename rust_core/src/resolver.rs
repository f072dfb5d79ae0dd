//! Entity resolution: free-text query -> rows of the static reference tables.
//!
//! Pure functions over borrowed tables. Nothing here logs or allocates beyond
//! the returned match lists.

use crate::error::{EntityKind, StatsError, StatsResult};
use crate::models::{Player, Team};
use strsim::jaro_winkler;

/// Similarity floor for "did you mean" suggestions
const SUGGESTION_THRESHOLD: f64 = 0.85;
const MAX_SUGGESTIONS: usize = 3;

/// Outcome of a lookup, consumed by exhaustive matching in the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    NotFound,
    Unique(T),
    Ambiguous(Vec<T>),
}

impl<T> Resolution<T> {
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Unique(matches.remove(0)),
            _ => Resolution::Ambiguous(matches),
        }
    }
}

/// Normalize a name for comparison: lowercase, fold accents, split hyphenated
/// names, drop other punctuation and collapse whitespace. "Nikola Jokić" and "nikola  jokic" compare equal.
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .map(|c| if c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ş' | 'š' | 'ș' => 's',
        'ţ' | 'ť' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Active players matching `query`, in table order.
///
/// Exact full-name matches take precedence; when there are none the query is
/// treated as a partial name and matched by containment. Inactive players are
/// never returned. An empty query matches nothing.
pub fn resolve_players<'a>(players: &'a [Player], query: &str) -> Vec<&'a Player> {
    let q = normalize(query);
    if q.is_empty() {
        return Vec::new();
    }

    let active = || players.iter().filter(|p| p.is_active);

    let exact: Vec<&Player> = active().filter(|p| normalize(&p.full_name) == q).collect();
    if !exact.is_empty() {
        return exact;
    }

    active()
        .filter(|p| normalize(&p.full_name).contains(&q))
        .collect()
}

/// Teams matching `query`, in table order.
///
/// A query equal to an abbreviation returns only that team. Otherwise the
/// query is matched as a substring of full name, nickname, city or state.
pub fn resolve_teams<'a>(teams: &'a [Team], query: &str) -> Vec<&'a Team> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    if let Some(team) = teams.iter().find(|t| t.abbreviation.to_lowercase() == q) {
        return vec![team];
    }

    teams
        .iter()
        .filter(|t| {
            [&t.full_name, &t.nickname, &t.city, &t.state]
                .iter()
                .any(|field| field.to_lowercase().contains(&q))
        })
        .collect()
}

/// Resolve a player for a command.
///
/// Name collisions between active players are not disambiguated: the first
/// match in table order wins.
pub fn find_player<'a>(players: &'a [Player], query: &str) -> StatsResult<&'a Player> {
    match Resolution::from_matches(resolve_players(players, query)) {
        Resolution::Unique(player) => Ok(player),
        Resolution::Ambiguous(matches) => Ok(matches[0]),
        Resolution::NotFound => Err(StatsError::NotFound {
            kind: EntityKind::Player,
            query: query.trim().to_string(),
            suggestions: suggest_players(players, query),
        }),
    }
}

/// Resolve a team for a command. More than one match is an error.
pub fn find_team<'a>(teams: &'a [Team], query: &str) -> StatsResult<&'a Team> {
    match Resolution::from_matches(resolve_teams(teams, query)) {
        Resolution::Unique(team) => Ok(team),
        Resolution::Ambiguous(matches) => Err(StatsError::AmbiguousMatch {
            query: query.trim().to_string(),
            candidates: matches.iter().map(|t| t.full_name.clone()).collect(),
        }),
        Resolution::NotFound => Err(StatsError::not_found(EntityKind::Team, query.trim())),
    }
}

/// Closest active player names by Jaro-Winkler similarity, best first
pub fn suggest_players(players: &[Player], query: &str) -> Vec<String> {
    let q = normalize(query);
    if q.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Player)> = players
        .iter()
        .filter(|p| p.is_active)
        .map(|p| (jaro_winkler(&q, &normalize(&p.full_name)), p))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, p)| p.full_name.clone())
        .collect()
}
