//! Row types for the destination tables
//!
//! Each row type knows its table and the columns it writes, which lets the
//! loader append any of them through one insert-or-replace path.

use crate::database::core::Table;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};

/// A row that can be appended to one of the store's tables
pub trait TableRecord {
    /// Destination table
    const TABLE: Table;

    /// Columns written on insert, in the same order as [`TableRecord::sql_params`]
    const COLUMNS: &'static [&'static str];

    /// Values bound to [`TableRecord::COLUMNS`]
    fn sql_params(&self) -> Vec<&dyn ToSql>;
}

/// Social Vulnerability Index scores for one census tract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SviRecord {
    pub fips: String,
    pub state: Option<String>,
    pub county: Option<String>,
    pub location: Option<String>,
    pub overall_svi: Option<f64>,
    pub socioeconomic_svi: Option<f64>,
    pub household_svi: Option<f64>,
    pub minority_svi: Option<f64>,
    pub housing_transport_svi: Option<f64>,
    pub last_updated: Option<String>,
}

impl SviRecord {
    pub(crate) const SELECT_COLUMNS: &'static str = "fips, state, county, location, overall_svi, socioeconomic_svi, household_svi, minority_svi, housing_transport_svi, last_updated";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SviRecord {
            fips: row.get(0)?,
            state: row.get(1)?,
            county: row.get(2)?,
            location: row.get(3)?,
            overall_svi: row.get(4)?,
            socioeconomic_svi: row.get(5)?,
            household_svi: row.get(6)?,
            minority_svi: row.get(7)?,
            housing_transport_svi: row.get(8)?,
            last_updated: row.get(9)?,
        })
    }
}

impl TableRecord for SviRecord {
    const TABLE: Table = Table::Svi;
    const COLUMNS: &'static [&'static str] = &[
        "fips",
        "state",
        "county",
        "location",
        "overall_svi",
        "socioeconomic_svi",
        "household_svi",
        "minority_svi",
        "housing_transport_svi",
        "last_updated",
    ];

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.fips,
            &self.state,
            &self.county,
            &self.location,
            &self.overall_svi,
            &self.socioeconomic_svi,
            &self.household_svi,
            &self.minority_svi,
            &self.housing_transport_svi,
            &self.last_updated,
        ]
    }
}

/// One CDC PLACES measure estimate for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacesRecord {
    pub location_id: String,
    pub location_type: Option<String>,
    pub measure_id: String,
    pub measure: Option<String>,
    pub data_value: Option<f64>,
    pub confidence_limit_low: Option<f64>,
    pub confidence_limit_high: Option<f64>,
    pub year: Option<String>,
    pub last_updated: Option<String>,
}

impl PlacesRecord {
    pub(crate) const SELECT_COLUMNS: &'static str = "location_id, location_type, measure_id, measure, data_value, confidence_limit_low, confidence_limit_high, year, last_updated";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PlacesRecord {
            location_id: row.get(0)?,
            location_type: row.get(1)?,
            measure_id: row.get(2)?,
            measure: row.get(3)?,
            data_value: row.get(4)?,
            confidence_limit_low: row.get(5)?,
            confidence_limit_high: row.get(6)?,
            year: row.get(7)?,
            last_updated: row.get(8)?,
        })
    }
}

impl TableRecord for PlacesRecord {
    const TABLE: Table = Table::Places;
    const COLUMNS: &'static [&'static str] = &[
        "location_id",
        "location_type",
        "measure_id",
        "measure",
        "data_value",
        "confidence_limit_low",
        "confidence_limit_high",
        "year",
        "last_updated",
    ];

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.location_id,
            &self.location_type,
            &self.measure_id,
            &self.measure,
            &self.data_value,
            &self.confidence_limit_low,
            &self.confidence_limit_high,
            &self.year,
            &self.last_updated,
        ]
    }
}

/// A location saved by a downstream application user
///
/// `census_tract` and `block_group` point at `svi_data` and `adi_data`, but
/// nothing checks that the referenced rows exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLocationRecord {
    pub user_id: Option<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub census_tract: Option<String>,
    pub block_group: Option<String>,
    pub zcta: Option<String>,
    pub created_date: Option<String>,
}

impl TableRecord for UserLocationRecord {
    const TABLE: Table = Table::UserLocations;
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "location_name",
        "address",
        "latitude",
        "longitude",
        "census_tract",
        "block_group",
        "zcta",
        "created_date",
    ];

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.user_id,
            &self.location_name,
            &self.address,
            &self.latitude,
            &self.longitude,
            &self.census_tract,
            &self.block_group,
            &self.zcta,
            &self.created_date,
        ]
    }
}

/// Records produced by one normalization call
///
/// `stamp` is captured once per batch; every row in the batch that carries a
/// `last_updated` column holds this same value, and the loader writes it to
/// the source registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch<R> {
    pub stamp: String,
    pub records: Vec<R>,
}

impl<R> RecordBatch<R> {
    /// Wrap records with a fresh timestamp
    pub fn new(records: Vec<R>) -> Self {
        Self {
            stamp: current_stamp(),
            records,
        }
    }

    pub fn with_stamp(stamp: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            stamp: stamp.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Current time as an RFC 3339 UTC string with microseconds
pub fn current_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_params() {
        let svi = SviRecord {
            fips: "01001020100".to_string(),
            state: None,
            county: None,
            location: None,
            overall_svi: None,
            socioeconomic_svi: None,
            household_svi: None,
            minority_svi: None,
            housing_transport_svi: None,
            last_updated: None,
        };
        assert_eq!(svi.sql_params().len(), SviRecord::COLUMNS.len());

        let places = PlacesRecord {
            location_id: "01001020100".to_string(),
            location_type: None,
            measure_id: "CSMOKING".to_string(),
            measure: None,
            data_value: None,
            confidence_limit_low: None,
            confidence_limit_high: None,
            year: None,
            last_updated: None,
        };
        assert_eq!(places.sql_params().len(), PlacesRecord::COLUMNS.len());

        let location = UserLocationRecord::default();
        assert_eq!(location.sql_params().len(), UserLocationRecord::COLUMNS.len());
    }

    #[test]
    fn test_stamp_is_rfc3339_utc() {
        let stamp = current_stamp();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_empty_batch() {
        let batch: RecordBatch<SviRecord> = RecordBatch::new(vec![]);
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
