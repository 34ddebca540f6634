//! PLACES Socrata query construction

/// Socrata resource for tract-level PLACES estimates
pub const PLACES_URL: &str = "https://data.cdc.gov/resource/cwsq-ngmh.json";

/// Measures fetched when none are named
pub const DEFAULT_MEASURES: [&str; 5] = ["CSMOKING", "BPHIGH", "DEPRESSION", "OBESITY", "DIABETES"];

/// Broader measure set used when loading a whole state
pub const EXTENDED_MEASURES: [&str; 16] = [
    "CSMOKING",
    "BPHIGH",
    "DEPRESSION",
    "OBESITY",
    "DIABETES",
    "PHLTH",
    "MHLTH",
    "CHOLSCREEN",
    "ACCESS2",
    "COLON_SCREEN",
    "MAMMOUSE",
    "CERVICAL",
    "DENTAL",
    "CHECKUP",
    "COREM",
    "COREW",
];

/// Parameters of one PLACES query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacesQuery {
    pub state_abbr: Option<String>,
    /// Matches location ids starting with this county FIPS
    pub county_fips: Option<String>,
    pub measures: Vec<String>,
    pub limit: u32,
}

impl Default for PlacesQuery {
    fn default() -> Self {
        Self {
            state_abbr: None,
            county_fips: None,
            measures: DEFAULT_MEASURES.iter().map(|m| m.to_string()).collect(),
            limit: 1000,
        }
    }
}

impl PlacesQuery {
    /// Socrata `$where` expression, `None` when nothing filters
    pub fn where_clause(&self) -> Option<String> {
        let mut clauses = Vec::new();
        if let Some(abbr) = &self.state_abbr {
            clauses.push(format!("stateabbr='{}'", abbr));
        }
        if let Some(county) = &self.county_fips {
            clauses.push(format!("locationid LIKE '{}%'", county));
        }
        if !self.measures.is_empty() {
            let measure_clause = self
                .measures
                .iter()
                .map(|m| format!("measureid='{}'", m))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({})", measure_clause));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("$limit".to_string(), self.limit.to_string())];
        if let Some(where_clause) = self.where_clause() {
            params.push(("$where".to_string(), where_clause));
        }
        params
    }
}
