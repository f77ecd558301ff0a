//! Per-request filter, sort and chart grouping over the leaderboard snapshot.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::error::LeaderboardError;
use crate::model::LeaderboardRow;

/// Chart group label for rows without a region.
pub const UNSPECIFIED_REGION: &str = "unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    OverallRate,
    GenderGap,
    BlackWhiteGap,
    HispanicWhiteGap,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::OverallRate, SortKey::GenderGap, SortKey::BlackWhiteGap, SortKey::HispanicWhiteGap];

    pub fn id(self) -> &'static str {
        match self {
            SortKey::OverallRate => "overall_rate",
            SortKey::GenderGap => "gender_gap",
            SortKey::BlackWhiteGap => "black_white_gap",
            SortKey::HispanicWhiteGap => "hispanic_white_gap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::OverallRate => "Overall Graduation Rate",
            SortKey::GenderGap => "Gender Gap",
            SortKey::BlackWhiteGap => "Black-White Gap",
            SortKey::HispanicWhiteGap => "Hispanic-White Gap",
        }
    }

    /// Overall rate ranks highest first; gaps rank smallest first.
    pub fn descending(self) -> bool { matches!(self, SortKey::OverallRate) }

    pub fn value(self, row: &LeaderboardRow) -> Option<f64> {
        match self {
            SortKey::OverallRate => row.overall_rate(),
            SortKey::GenderGap => row.gender_gap(),
            SortKey::BlackWhiteGap => row.black_white_gap(),
            SortKey::HispanicWhiteGap => row.hispanic_white_gap(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.id()) }
}

/// Accepts the snake_case id or the display label.
impl FromStr for SortKey {
    type Err = LeaderboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|k| k.id() == s || k.label() == s)
            .ok_or_else(|| LeaderboardError::InvalidArgument(format!("unknown sort key {s:?}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub search_text: Option<String>,
    pub region_filter: Option<String>,
    pub sort_key: SortKey,
}

impl QueryParams {
    pub fn new(sort_key: SortKey) -> Self { Self { sort_key, ..Default::default() } }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region_filter = Some(region.into());
        self
    }

    /// Builds params from untyped request input. A missing sort key falls back
    /// to the overall rate; an unknown one is `InvalidArgument`.
    pub fn from_request(search: Option<&str>, region: Option<&str>, sort: Option<&str>) -> Result<Self, LeaderboardError> {
        let sort_key = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => SortKey::default(),
        };
        Ok(Self { search_text: search.map(str::to_string), region_filter: region.map(str::to_string), sort_key })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<LeaderboardRow>,
    /// Sort-key values per region, in result order. Nulls are kept; the chart drops them.
    pub chart_groups: BTreeMap<String, Vec<Option<f64>>>,
}

/// Nulls last in either direction. Values are finite, so `partial_cmp` always answers.
fn compare_nulls_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[instrument(level = "debug", skip_all, fields(rows_in = rows.len(), sort_key = %params.sort_key))]
pub fn query(rows: &[LeaderboardRow], params: &QueryParams) -> QueryResult {
    let region = params.region_filter.as_deref().filter(|r| !r.is_empty());
    let needle = params.search_text.as_deref().filter(|s| !s.is_empty()).map(str::to_lowercase);

    let mut selected: Vec<&LeaderboardRow> = rows
        .iter()
        .filter(|row| region.map_or(true, |r| row.region() == Some(r)))
        .filter(|row| needle.as_deref().map_or(true, |n| row.institution_contains(n)))
        .collect();

    let key = params.sort_key;
    // slice::sort_by is stable
    selected.sort_by(|a, b| compare_nulls_last(key.value(a), key.value(b), key.descending()));

    let mut chart_groups: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for row in &selected {
        let group = row.region().unwrap_or(UNSPECIFIED_REGION);
        chart_groups.entry(group.to_string()).or_default().push(key.value(row));
    }

    debug!(rows_out = selected.len(), groups = chart_groups.len(), "query_complete");
    QueryResult { rows: selected.into_iter().cloned().collect(), chart_groups }
}

/// Distinct non-null regions, sorted, for the region dropdown.
pub fn region_options(rows: &[LeaderboardRow]) -> Vec<String> {
    rows.iter().filter_map(|r| r.region()).collect::<BTreeSet<_>>().into_iter().map(str::to_string).collect()
}
