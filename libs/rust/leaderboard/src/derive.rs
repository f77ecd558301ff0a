//! Raw table -> leaderboard rows.

use tracing::{debug, instrument};

use crate::error::{LeaderboardError, Result};
use crate::model::{LeaderboardRow, RawRecord, RawTable, Rates};
use crate::regions::RegionCodeTable;

/// Source field names for each leaderboard input. Defaults to the IPEDS
/// `DRVGR2023` export headers; note the double spaces inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    pub institution: String,
    pub region: String,
    pub overall_rate: String,
    pub men_rate: String,
    pub women_rate: String,
    pub black_rate: String,
    pub hispanic_rate: String,
    pub white_rate: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        let rate = |group: &str| format!("Graduation rate - Bachelor degree within 6 years  {group} (DRVGR2023)");
        Self {
            institution: "Institution Name".into(),
            region: "State".into(),
            overall_rate: rate("total"),
            men_rate: rate("men"),
            women_rate: rate("women"),
            black_rate: rate("Black  non-Hispanic"),
            hispanic_rate: rate("Hispanic"),
            white_rate: rate("White  non-Hispanic"),
        }
    }
}

impl SourceSchema {
    pub fn required_fields(&self) -> [&str; 8] {
        [
            self.institution.as_str(),
            self.region.as_str(),
            self.overall_rate.as_str(),
            self.men_rate.as_str(),
            self.women_rate.as_str(),
            self.black_rate.as_str(),
            self.hispanic_rate.as_str(),
            self.white_rate.as_str(),
        ]
    }

    /// Fields absent from `table`'s header, in schema order.
    pub fn missing_fields(&self, table: &RawTable) -> Vec<String> {
        self.required_fields().into_iter().filter(|f| !table.has_column(f)).map(str::to_string).collect()
    }

    fn row(&self, raw: &RawRecord, regions: &RegionCodeTable) -> LeaderboardRow {
        let rates = Rates {
            overall: raw.number(&self.overall_rate),
            men: raw.number(&self.men_rate),
            women: raw.number(&self.women_rate),
            black: raw.number(&self.black_rate),
            hispanic: raw.number(&self.hispanic_rate),
            white: raw.number(&self.white_rate),
        };
        LeaderboardRow::new(
            raw.text(&self.institution).map(str::to_string),
            raw.text(&self.region).map(str::to_string),
            rates,
            regions,
        )
    }
}

/// Derive with the default IPEDS schema.
pub fn derive(raw: &RawTable, regions: &RegionCodeTable) -> Result<Vec<LeaderboardRow>> {
    derive_with_schema(raw, &SourceSchema::default(), regions)
}

/// One output row per input row, in input order. The header is checked once;
/// per-row gaps in the data become nulls.
#[instrument(level = "debug", skip_all, fields(rows = raw.rows.len()))]
pub fn derive_with_schema(raw: &RawTable, schema: &SourceSchema, regions: &RegionCodeTable) -> Result<Vec<LeaderboardRow>> {
    let missing = schema.missing_fields(raw);
    if !missing.is_empty() {
        return Err(LeaderboardError::Schema { missing });
    }
    let rows: Vec<LeaderboardRow> = raw.rows.iter().map(|r| schema.row(r, regions)).collect();
    let unmapped = rows.iter().filter(|r| r.region().is_some() && r.region_code().is_none()).count();
    debug!(derived = rows.len(), unmapped_regions = unmapped, "derive_complete");
    Ok(rows)
}
