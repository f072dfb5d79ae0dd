//! Typed outcomes for lookups and report assembly.
//!
//! Nothing in here is meant to reach a user verbatim. The bot maps each
//! variant to a short plain-text reply.

use thiserror::Error;

/// A stats row did not have the shape the report code relies on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has the wrong type (expected {expected})")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` has an invalid value: {value}")]
    InvalidValue { field: String, value: String },
}

impl FormatError {
    pub fn missing(field: &str) -> Self {
        FormatError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn mismatch(field: &str, expected: &'static str) -> Self {
        FormatError::TypeMismatch {
            field: field.to_string(),
            expected,
        }
    }

    pub fn invalid(field: &str, value: impl ToString) -> Self {
        FormatError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Which reference table a lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Team,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Team => "team",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Zero entities matched the query.
    #[error("no {} found matching '{query}'", kind.as_str())]
    NotFound {
        kind: EntityKind,
        query: String,
        suggestions: Vec<String>,
    },

    /// More than one team matched. Players never produce this.
    #[error("'{query}' matches {} teams", candidates.len())]
    AmbiguousMatch {
        query: String,
        candidates: Vec<String>,
    },

    #[error("need at least {required} games, only {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl StatsError {
    pub fn not_found(kind: EntityKind, query: &str) -> Self {
        StatsError::NotFound {
            kind,
            query: query.to_string(),
            suggestions: Vec::new(),
        }
    }

    pub fn insufficient(required: usize, available: usize) -> Self {
        StatsError::InsufficientData {
            required,
            available,
        }
    }
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;
