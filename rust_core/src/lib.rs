//! Courtside Core - NBA stat lookups and reply formatting.
//!
//! This crate provides:
//! - Typed stat rows decoded from the stats API's tabular responses
//! - Player and team resolution against static reference tables
//! - Deterministic fixed-width text reports (game logs, head-to-head,
//!   rosters, season averages, recent form, leaderboards)
//! - An async `StatsProvider` seam with a cached stats.nba.com client
//! - Circuit breaker for the upstream API

pub mod circuit_breaker;
pub mod clients;
pub mod error;
pub mod models;
pub mod reference;
pub mod report;
pub mod resolver;
pub mod season;

pub use clients::{NbaStatsClient, NbaStatsConfig, StatsProvider};
pub use error::{EntityKind, FormatError, StatsError, StatsResult};
pub use models::{
    GameRecord, LeaderRow, Player, RosterEntry, SeasonAggregate, SeasonType, StatCategory, Team,
};
pub use reference::ReferenceData;
pub use resolver::Resolution;
