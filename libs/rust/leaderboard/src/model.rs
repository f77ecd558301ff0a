//! Raw source rows and the derived leaderboard row.

use serde::Serialize;
use std::collections::HashMap;

use crate::regions::RegionCodeTable;

/// A single cell as handed over by the loader. Empty cells are simply absent
/// from the record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// One source row: field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, field: impl Into<String>, value: RawValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: RawValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> { self.fields.get(field) }

    /// Finite numbers only; text and absent cells read as null.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field) {
            Some(RawValue::Number(n)) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(RawValue::Text(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A loaded sheet: the header row plus the data rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRecord>) -> Self { Self { columns, rows } }

    pub fn has_column(&self, name: &str) -> bool { self.columns.iter().any(|c| c == name) }
}

/// The six subgroup graduation rates, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub overall: Option<f64>,
    pub men: Option<f64>,
    pub women: Option<f64>,
    pub black: Option<f64>,
    pub hispanic: Option<f64>,
    pub white: Option<f64>,
}

/// One institution with its derived equity gaps.
///
/// Gap fields are private and computed in [`LeaderboardRow::new`], so they
/// always agree with the rates they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    institution: Option<String>,
    region: Option<String>,
    overall_rate: Option<f64>,
    men_rate: Option<f64>,
    women_rate: Option<f64>,
    black_rate: Option<f64>,
    hispanic_rate: Option<f64>,
    white_rate: Option<f64>,
    gender_gap: Option<f64>,
    black_white_gap: Option<f64>,
    hispanic_white_gap: Option<f64>,
    region_code: Option<String>,
    #[serde(skip)]
    institution_folded: Option<String>,
}

/// Drops NaN/inf and folds `-0.0` into `0.0`.
fn finite(v: Option<f64>) -> Option<f64> { v.filter(|x| x.is_finite()).map(|x| x + 0.0) }

/// Null if either side is null.
fn gap(minuend: Option<f64>, subtrahend: Option<f64>) -> Option<f64> { Some(minuend? - subtrahend?) }

impl LeaderboardRow {
    pub fn new(institution: Option<String>, region: Option<String>, rates: Rates, regions: &RegionCodeTable) -> Self {
        let institution = institution.filter(|s| !s.trim().is_empty());
        let region = region.filter(|s| !s.trim().is_empty());
        let region_code = region.as_deref().and_then(|r| regions.code_for(r)).map(str::to_string);
        let overall_rate = finite(rates.overall);
        let men_rate = finite(rates.men);
        let women_rate = finite(rates.women);
        let black_rate = finite(rates.black);
        let hispanic_rate = finite(rates.hispanic);
        let white_rate = finite(rates.white);
        Self {
            institution_folded: institution.as_deref().map(str::to_lowercase),
            institution,
            region,
            overall_rate,
            men_rate,
            women_rate,
            black_rate,
            hispanic_rate,
            white_rate,
            gender_gap: gap(women_rate, men_rate),
            black_white_gap: gap(white_rate, black_rate),
            hispanic_white_gap: gap(white_rate, hispanic_rate),
            region_code,
        }
    }

    pub fn institution(&self) -> Option<&str> { self.institution.as_deref() }
    pub fn region(&self) -> Option<&str> { self.region.as_deref() }
    pub fn region_code(&self) -> Option<&str> { self.region_code.as_deref() }
    pub fn overall_rate(&self) -> Option<f64> { self.overall_rate }
    pub fn men_rate(&self) -> Option<f64> { self.men_rate }
    pub fn women_rate(&self) -> Option<f64> { self.women_rate }
    pub fn black_rate(&self) -> Option<f64> { self.black_rate }
    pub fn hispanic_rate(&self) -> Option<f64> { self.hispanic_rate }
    pub fn white_rate(&self) -> Option<f64> { self.white_rate }
    pub fn gender_gap(&self) -> Option<f64> { self.gender_gap }
    pub fn black_white_gap(&self) -> Option<f64> { self.black_white_gap }
    pub fn hispanic_white_gap(&self) -> Option<f64> { self.hispanic_white_gap }

    /// `needle` must already be lowercased.
    pub(crate) fn institution_contains(&self, needle: &str) -> bool {
        self.institution_folded.as_deref().map_or(false, |name| name.contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub id: &'static str,
    pub label: &'static str,
}

/// Table columns in display order, keyed by the JSON field name of [`LeaderboardRow`].
pub const COLUMNS: [Column; 12] = [
    Column { id: "institution", label: "Institution" },
    Column { id: "region", label: "State" },
    Column { id: "overall_rate", label: "Overall Graduation Rate" },
    Column { id: "men_rate", label: "Men Graduation Rate" },
    Column { id: "women_rate", label: "Women Graduation Rate" },
    Column { id: "black_rate", label: "Black Graduation Rate" },
    Column { id: "hispanic_rate", label: "Hispanic Graduation Rate" },
    Column { id: "white_rate", label: "White Graduation Rate" },
    Column { id: "gender_gap", label: "Gender Gap" },
    Column { id: "black_white_gap", label: "Black-White Gap" },
    Column { id: "hispanic_white_gap", label: "Hispanic-White Gap" },
    Column { id: "region_code", label: "State Abbreviation" },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(overall: f64, men: Option<f64>, women: Option<f64>) -> Rates {
        Rates { overall: Some(overall), men, women, black: Some(40.0), hispanic: None, white: Some(70.0) }
    }

    #[test]
    fn gaps_follow_rates() {
        let row = LeaderboardRow::new(Some("Kent State".into()), Some("Ohio".into()), rates(65.0, Some(60.0), Some(68.5)), &RegionCodeTable::us_states());
        assert_eq!(row.gender_gap(), Some(8.5));
        assert_eq!(row.black_white_gap(), Some(30.0));
        assert_eq!(row.hispanic_white_gap(), None);
        assert_eq!(row.region_code(), Some("OH"));
    }

    #[test]
    fn null_operand_nulls_the_gap() {
        let row = LeaderboardRow::new(Some("X".into()), None, rates(50.0, None, Some(55.0)), &RegionCodeTable::default());
        assert_eq!(row.gender_gap(), None);
        assert_eq!(row.region_code(), None);
    }

    #[test]
    fn non_finite_rates_become_null() {
        let r = Rates { overall: Some(f64::NAN), men: Some(f64::INFINITY), women: Some(50.0), ..Default::default() };
        let row = LeaderboardRow::new(Some("X".into()), None, r, &RegionCodeTable::default());
        assert_eq!(row.overall_rate(), None);
        assert_eq!(row.gender_gap(), None);
    }

    #[test]
    fn negative_zero_reads_as_zero() {
        let r = Rates { white: Some(-0.0), black: Some(0.0), ..Default::default() };
        let row = LeaderboardRow::new(None, None, r, &RegionCodeTable::default());
        assert!(row.white_rate().unwrap().is_sign_positive());
        assert!(row.black_white_gap().unwrap().is_sign_positive());
    }

    #[test]
    fn blank_institution_is_null() {
        let row = LeaderboardRow::new(Some("   ".into()), Some("".into()), Rates::default(), &RegionCodeTable::default());
        assert_eq!(row.institution(), None);
        assert_eq!(row.region(), None);
        assert!(!row.institution_contains("a"));
    }

    #[test]
    fn serializes_with_column_ids() {
        let row = LeaderboardRow::new(Some("A".into()), Some("Ohio".into()), rates(80.0, Some(78.0), Some(82.0)), &RegionCodeTable::us_states());
        let v = serde_json::to_value(&row).unwrap();
        for col in COLUMNS.iter() {
            assert!(v.get(col.id).is_some(), "missing {}", col.id);
        }
        assert!(v.get("institution_folded").is_none());
        assert_eq!(v["gender_gap"], 4.0);
    }

    #[test]
    fn raw_record_reads_numbers_and_text() {
        let rec = RawRecord::new()
            .with("a", RawValue::Number(1.5))
            .with("b", RawValue::Text("hi".into()))
            .with("c", RawValue::Text("  ".into()))
            .with("d", RawValue::Number(f64::NAN));
        assert_eq!(rec.number("a"), Some(1.5));
        assert_eq!(rec.number("b"), None);
        assert_eq!(rec.number("d"), None);
        assert_eq!(rec.number("zz"), None);
        assert_eq!(rec.text("b"), Some("hi"));
        assert_eq!(rec.text("a"), None);
        assert_eq!(rec.text("c"), None);
    }
}
