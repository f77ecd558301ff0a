//! Region name to short display code lookup.

use serde::Deserialize;
use std::collections::HashMap;

/// Injected lookup table; the loader may replace the built-in US table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RegionCodeTable {
    codes: HashMap<String, String>,
}

const US_STATES: [(&str, &str); 50] = [
    ("Alabama", "AL"), ("Alaska", "AK"), ("Arizona", "AZ"), ("Arkansas", "AR"), ("California", "CA"),
    ("Colorado", "CO"), ("Connecticut", "CT"), ("Delaware", "DE"), ("Florida", "FL"), ("Georgia", "GA"),
    ("Hawaii", "HI"), ("Idaho", "ID"), ("Illinois", "IL"), ("Indiana", "IN"), ("Iowa", "IA"), ("Kansas", "KS"),
    ("Kentucky", "KY"), ("Louisiana", "LA"), ("Maine", "ME"), ("Maryland", "MD"), ("Massachusetts", "MA"),
    ("Michigan", "MI"), ("Minnesota", "MN"), ("Mississippi", "MS"), ("Missouri", "MO"), ("Montana", "MT"),
    ("Nebraska", "NE"), ("Nevada", "NV"), ("New Hampshire", "NH"), ("New Jersey", "NJ"), ("New Mexico", "NM"),
    ("New York", "NY"), ("North Carolina", "NC"), ("North Dakota", "ND"), ("Ohio", "OH"), ("Oklahoma", "OK"),
    ("Oregon", "OR"), ("Pennsylvania", "PA"), ("Rhode Island", "RI"), ("South Carolina", "SC"),
    ("South Dakota", "SD"), ("Tennessee", "TN"), ("Texas", "TX"), ("Utah", "UT"), ("Vermont", "VT"),
    ("Virginia", "VA"), ("Washington", "WA"), ("West Virginia", "WV"), ("Wisconsin", "WI"), ("Wyoming", "WY"),
];

impl RegionCodeTable {
    pub fn new(codes: HashMap<String, String>) -> Self { Self { codes } }

    pub fn us_states() -> Self {
        US_STATES.iter().map(|(name, code)| (name.to_string(), code.to_string())).collect()
    }

    /// Exact, case-sensitive lookup.
    pub fn code_for(&self, region: &str) -> Option<&str> { self.codes.get(region).map(String::as_str) }

    pub fn len(&self) -> usize { self.codes.len() }
    pub fn is_empty(&self) -> bool { self.codes.is_empty() }
}

impl FromIterator<(String, String)> for RegionCodeTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self { Self { codes: iter.into_iter().collect() } }
}
