use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// Raised once, before any row is read, when the header lacks a required field.
    #[error("source schema is missing required field(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
