//! PLACES row mapping

use super::fields::{ColumnAlias, RawRow};
use super::RawPayload;
use crate::database::sdoh::{PlacesRecord, RecordBatch};
use tracing::warn;

const LOCATION_ID: ColumnAlias = ColumnAlias::new("location_id", "locationid");
const LOCATION_TYPE: ColumnAlias = ColumnAlias::new("location_type", "locationtype");
const MEASURE_ID: ColumnAlias = ColumnAlias::new("measure_id", "measureid");
const MEASURE: ColumnAlias = ColumnAlias::new("measure", "measure");
const DATA_VALUE: ColumnAlias = ColumnAlias::new("data_value", "data_value");
const LOW: ColumnAlias = ColumnAlias::new("confidence_limit_low", "low_confidence_limit");
const HIGH: ColumnAlias = ColumnAlias::new("confidence_limit_high", "high_confidence_limit");
const YEAR: ColumnAlias = ColumnAlias::new("year", "year");

/// Map a payload of PLACES estimates onto `places_data` rows
///
/// Rows missing either the location id or the measure id are skipped.
pub fn normalize_places(payload: &RawPayload) -> RecordBatch<PlacesRecord> {
    let mut batch = RecordBatch::new(Vec::with_capacity(payload.len()));
    let stamp = batch.stamp.clone();

    for (idx, row) in payload.rows().enumerate() {
        match places_row(&row, &stamp) {
            Some(record) => batch.records.push(record),
            None => warn!("skipping PLACES row {}: missing location or measure id", idx),
        }
    }
    batch
}

fn places_row(row: &RawRow<'_>, stamp: &str) -> Option<PlacesRecord> {
    Some(PlacesRecord {
        location_id: LOCATION_ID.text(row)?,
        location_type: LOCATION_TYPE.text(row),
        measure_id: MEASURE_ID.text(row)?,
        measure: MEASURE.text(row),
        data_value: DATA_VALUE.real(row),
        confidence_limit_low: LOW.real(row),
        confidence_limit_high: HIGH.real(row),
        year: YEAR.text(row),
        last_updated: Some(stamp.to_string()),
    })
}
