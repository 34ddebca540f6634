//! SVI row mapping

use super::fields::{ColumnAlias, RawRow};
use super::RawPayload;
use crate::database::sdoh::{RecordBatch, SviRecord};
use tracing::warn;

const FIPS: ColumnAlias = ColumnAlias::new("fips", "FIPS");
const STATE: ColumnAlias = ColumnAlias::new("state", "STATE");
const COUNTY: ColumnAlias = ColumnAlias::new("county", "COUNTY");
const LOCATION: ColumnAlias = ColumnAlias::new("location", "LOCATION");
const OVERALL: ColumnAlias = ColumnAlias::new("overall_svi", "RPL_THEMES");
const SOCIOECONOMIC: ColumnAlias = ColumnAlias::new("socioeconomic_svi", "RPL_THEME1");
const HOUSEHOLD: ColumnAlias = ColumnAlias::new("household_svi", "RPL_THEME2");
const MINORITY: ColumnAlias = ColumnAlias::new("minority_svi", "RPL_THEME3");
const HOUSING_TRANSPORT: ColumnAlias = ColumnAlias::new("housing_transport_svi", "RPL_THEME4");

/// Map a payload of SVI tracts onto `svi_data` rows
///
/// Rows without a FIPS code are skipped.
pub fn normalize_svi(payload: &RawPayload) -> RecordBatch<SviRecord> {
    let mut batch = RecordBatch::new(Vec::with_capacity(payload.len()));
    let stamp = batch.stamp.clone();

    for (idx, row) in payload.rows().enumerate() {
        match svi_row(&row, &stamp) {
            Some(record) => batch.records.push(record),
            None => warn!("skipping SVI row {}: missing FIPS code", idx),
        }
    }
    batch
}

fn svi_row(row: &RawRow<'_>, stamp: &str) -> Option<SviRecord> {
    Some(SviRecord {
        fips: FIPS.text(row)?,
        state: STATE.text(row),
        county: COUNTY.text(row),
        location: LOCATION.text(row),
        overall_svi: OVERALL.real(row),
        socioeconomic_svi: SOCIOECONOMIC.real(row),
        household_svi: HOUSEHOLD.real(row),
        minority_svi: MINORITY.real(row),
        housing_transport_svi: HOUSING_TRANSPORT.real(row),
        last_updated: Some(stamp.to_string()),
    })
}
