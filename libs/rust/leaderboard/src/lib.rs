//! Graduation-rate leaderboard: derives equity gaps from raw institution rows
//! and answers filter/sort/group queries over the resulting snapshot.
//!
//! The snapshot is built once and shared read-only; [`query`] is a pure
//! function, so concurrent callers need no locking.

use std::sync::Arc;

pub mod derive;
pub mod error;
pub mod model;
pub mod query;
pub mod regions;

pub use derive::{derive, derive_with_schema, SourceSchema};
pub use error::{LeaderboardError, Result};
pub use model::{Column, LeaderboardRow, RawRecord, RawTable, RawValue, Rates, COLUMNS};
pub use query::{query, region_options, QueryParams, QueryResult, SortKey, UNSPECIFIED_REGION};
pub use regions::RegionCodeTable;

/// Immutable, cheaply clonable set of derived rows.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    rows: Arc<[LeaderboardRow]>,
}

impl Leaderboard {
    pub fn new(rows: Vec<LeaderboardRow>) -> Self { Self { rows: rows.into() } }

    pub fn from_raw(raw: &RawTable, schema: &SourceSchema, regions: &RegionCodeTable) -> Result<Self> {
        Ok(Self::new(derive_with_schema(raw, schema, regions)?))
    }

    pub fn rows(&self) -> &[LeaderboardRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn query(&self, params: &QueryParams) -> QueryResult { query(&self.rows, params) }

    pub fn region_options(&self) -> Vec<String> { region_options(&self.rows) }
}
