//! SVI ArcGIS query construction

/// ArcGIS MapServer query endpoint for the 2020 tract-level SVI layer
pub const SVI_QUERY_URL: &str = "https://onemap.cdc.gov/OneMapServices/rest/services/SVI/CDC_ATSDR_Social_Vulnerability_Index_2020_USA/MapServer/2/query";

/// Fields requested for targeted SVI loads
pub const SVI_FIELDS: [&str; 11] = [
    "FIPS",
    "STATE",
    "ST_ABBR",
    "STCNTY",
    "COUNTY",
    "LOCATION",
    "RPL_THEMES",
    "RPL_THEME1",
    "RPL_THEME2",
    "RPL_THEME3",
    "RPL_THEME4",
];

/// State FIPS codes covered by a full pull (50 states plus DC)
pub const STATE_FIPS_CODES: [&str; 51] = [
    "01", "02", "04", "05", "06", "08", "09", "10", "11", "12", "13", "15", "16", "17", "18",
    "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32", "33",
    "34", "35", "36", "37", "38", "39", "40", "41", "42", "44", "45", "46", "47", "48", "49",
    "50", "51", "53", "54", "55", "56",
];

/// Parameters of one SVI query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SviQuery {
    pub state_fips: Option<String>,
    /// Five-digit state+county FIPS; wins over `state_fips`
    pub county_fips: Option<String>,
    pub limit: Option<u32>,
    /// Request every field (`outFields=*`) instead of [`SVI_FIELDS`]
    pub all_fields: bool,
}

impl SviQuery {
    /// Every tract of one state, all fields, no record limit
    pub fn full_state(state_fips: &str) -> Self {
        Self {
            state_fips: Some(state_fips.to_string()),
            county_fips: None,
            limit: None,
            all_fields: true,
        }
    }

    pub fn where_clause(&self) -> String {
        match (&self.county_fips, &self.state_fips) {
            (Some(county), _) => format!("STCNTY='{}'", county),
            (None, Some(state)) => format!("STATE='{}'", state),
            (None, None) => "1=1".to_string(),
        }
    }

    pub fn out_fields(&self) -> String {
        if self.all_fields {
            "*".to_string()
        } else {
            SVI_FIELDS.join(",")
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("where".to_string(), self.where_clause()),
            ("outFields".to_string(), self.out_fields()),
            ("returnGeometry".to_string(), "false".to_string()),
            ("f".to_string(), "json".to_string()),
        ];
        if let Some(limit) = self.limit {
            params.push(("resultRecordCount".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause() {
        assert_eq!(SviQuery::default().where_clause(), "1=1");

        let state = SviQuery {
            state_fips: Some("01".to_string()),
            ..Default::default()
        };
        assert_eq!(state.where_clause(), "STATE='01'");

        let county = SviQuery {
            state_fips: Some("01".to_string()),
            county_fips: Some("01001".to_string()),
            ..Default::default()
        };
        assert_eq!(county.where_clause(), "STCNTY='01001'");
    }

    #[test]
    fn test_params() {
        let query = SviQuery {
            state_fips: Some("01".to_string()),
            limit: Some(1000),
            ..Default::default()
        };
        let params = query.params();
        assert!(params.contains(&(
            "outFields".to_string(),
            "FIPS,STATE,ST_ABBR,STCNTY,COUNTY,LOCATION,RPL_THEMES,RPL_THEME1,RPL_THEME2,RPL_THEME3,RPL_THEME4".to_string()
        )));
        assert!(params.contains(&("resultRecordCount".to_string(), "1000".to_string())));
        assert!(params.contains(&("returnGeometry".to_string(), "false".to_string())));

        let full = SviQuery::full_state("56").params();
        assert!(full.contains(&("outFields".to_string(), "*".to_string())));
        assert!(!full.iter().any(|(k, _)| k == "resultRecordCount"));
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(STATE_FIPS_CODES.len(), 51);
        for skipped in ["03", "07", "14", "43", "52"] {
            assert!(!STATE_FIPS_CODES.contains(&skipped));
        }
    }
}
