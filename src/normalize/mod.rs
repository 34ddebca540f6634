//! Record normalization
//!
//! Upstream payloads arrive in three shapes: ArcGIS feature collections
//! (SVI), flat record lists (PLACES, either a bare array or wrapped in a
//! `results` envelope) and CSV files with a header line. [`RawPayload`]
//! captures the shape once; the table mappers in [`svi`] and [`places`] then
//! turn any shape into fixed row types.

pub mod fields;
pub mod places;
pub mod svi;

pub use fields::{coerce_real, coerce_text, ColumnAlias, FieldRef, RawRow};
pub use places::normalize_places;
pub use svi::normalize_svi;

use crate::error::{Result, SdohError};
use serde_json::{Map, Value};
use std::path::Path;

/// A payload whose shape has been recognized
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// `{"features": [{"attributes": {...}}, ...]}`
    FeatureCollection(Vec<Map<String, Value>>),
    /// `[{...}, ...]` or `{"results": [{...}, ...]}`
    RecordList(Vec<Map<String, Value>>),
    /// Rows of a delimited file, keyed by its header line
    DelimitedRows {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl RawPayload {
    /// Classify a parsed JSON document
    ///
    /// Features without an `attributes` object and list entries that are not
    /// objects are dropped.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(RawPayload::RecordList(objects(items))),
            Value::Object(mut map) => {
                if let Some(Value::Array(features)) = map.remove("features") {
                    let rows = features
                        .into_iter()
                        .filter_map(|f| match f {
                            Value::Object(mut feature) => match feature.remove("attributes") {
                                Some(Value::Object(attrs)) => Some(attrs),
                                _ => None,
                            },
                            _ => None,
                        })
                        .collect();
                    Ok(RawPayload::FeatureCollection(rows))
                } else if let Some(Value::Array(results)) = map.remove("results") {
                    Ok(RawPayload::RecordList(objects(results)))
                } else {
                    let keys: Vec<&String> = map.keys().collect();
                    Err(SdohError::invalid_input(format!(
                        "unrecognized payload shape: object with keys {:?}",
                        keys
                    )))
                }
            }
            other => Err(SdohError::invalid_input(format!(
                "unrecognized payload shape: {}",
                json_kind(&other)
            ))),
        }
    }

    /// Read a CSV file with a header line
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SdohError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawPayload::DelimitedRows { headers, rows })
    }

    /// Pick the payload from whichever source was supplied
    ///
    /// JSON takes precedence when both are given.
    pub fn from_sources(json: Option<Value>, csv_path: Option<&Path>) -> Result<Self> {
        match (json, csv_path) {
            (Some(value), _) => Self::from_json(value),
            (None, Some(path)) => Self::from_csv_path(path),
            (None, None) => Err(SdohError::invalid_input("no data source supplied")),
        }
    }

    /// Read whichever local files were supplied, with the same precedence
    /// as [`Self::from_sources`]
    pub fn from_files(json_path: Option<&Path>, csv_path: Option<&Path>) -> Result<Self> {
        let json = match json_path {
            Some(path) => Some(read_json_file(path)?),
            None => None,
        };
        Self::from_sources(json, csv_path)
    }

    /// Read a JSON document from disk and classify it
    pub fn from_json_path(path: &Path) -> Result<Self> {
        Self::from_json(read_json_file(path)?)
    }

    pub fn len(&self) -> usize {
        match self {
            RawPayload::FeatureCollection(rows) | RawPayload::RecordList(rows) => rows.len(),
            RawPayload::DelimitedRows { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the rows regardless of shape
    pub fn rows(&self) -> Box<dyn Iterator<Item = RawRow<'_>> + '_> {
        match self {
            RawPayload::FeatureCollection(rows) | RawPayload::RecordList(rows) => {
                Box::new(rows.iter().map(RawRow::Object))
            }
            RawPayload::DelimitedRows { headers, rows } => {
                Box::new(rows.iter().map(move |values| RawRow::Delimited {
                    headers: headers.as_slice(),
                    values: values.as_slice(),
                }))
            }
        }
    }
}

fn objects(items: Vec<Value>) -> Vec<Map<String, Value>> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn read_json_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(SdohError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection() {
        let payload = RawPayload::from_json(json!({
            "features": [
                {"attributes": {"FIPS": "01001020100"}},
                {"geometry": null}
            ]
        }))
        .unwrap();

        match payload {
            RawPayload::FeatureCollection(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0]["FIPS"], json!("01001020100"));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_record_list_and_results_envelope() {
        let bare = RawPayload::from_json(json!([{"locationid": "01001"}, 5])).unwrap();
        assert!(matches!(&bare, RawPayload::RecordList(rows) if rows.len() == 1));

        let wrapped =
            RawPayload::from_json(json!({"results": [{"locationid": "01001"}]})).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_unrecognized_shapes_rejected() {
        for value in [json!({"data": []}), json!("text"), json!(null), json!(42)] {
            assert!(matches!(
                RawPayload::from_json(value),
                Err(SdohError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_from_sources() {
        assert!(matches!(
            RawPayload::from_sources(None, None),
            Err(SdohError::InvalidInput(msg)) if msg == "no data source supplied"
        ));

        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("svi.csv");
        std::fs::write(&csv_path, "FIPS,RPL_THEMES\n01001020100,0.5\n").unwrap();

        let from_json =
            RawPayload::from_sources(Some(json!([{"FIPS": "x"}])), Some(csv_path.as_path())).unwrap();
        assert!(matches!(from_json, RawPayload::RecordList(_)));

        let from_csv = RawPayload::from_sources(None, Some(csv_path.as_path())).unwrap();
        assert_eq!(
            from_csv,
            RawPayload::DelimitedRows {
                headers: vec!["FIPS".to_string(), "RPL_THEMES".to_string()],
                rows: vec![vec!["01001020100".to_string(), "0.5".to_string()]],
            }
        );
    }

    #[test]
    fn test_from_files_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("places.csv");
        let json_path = dir.path().join("places.json");
        std::fs::write(&csv_path, "LocationID,MeasureId\n01001020100,CSMOKING\n").unwrap();
        std::fs::write(&json_path, r#"{"results": [{"locationid": "01001020100"}]}"#).unwrap();

        let both = RawPayload::from_files(Some(json_path.as_path()), Some(csv_path.as_path()));
        assert!(matches!(both, Ok(RawPayload::RecordList(rows)) if rows.len() == 1));

        let csv_only = RawPayload::from_files(None, Some(csv_path.as_path())).unwrap();
        assert!(matches!(csv_only, RawPayload::DelimitedRows { .. }));

        let missing = dir.path().join("absent.json");
        assert!(matches!(
            RawPayload::from_files(Some(missing.as_path()), Some(csv_path.as_path())),
            Err(SdohError::NotFound(p)) if p == missing
        ));
        assert!(matches!(
            RawPayload::from_files(None, None),
            Err(SdohError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_csv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(matches!(
            RawPayload::from_csv_path(&path),
            Err(SdohError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_rows_iterates_every_shape() {
        let payload = RawPayload::DelimitedRows {
            headers: vec!["a".to_string()],
            rows: vec![vec!["1".to_string()], vec!["2".to_string()]],
        };
        let values: Vec<_> = payload
            .rows()
            .map(|row| row.get("a").and_then(coerce_text))
            .collect();
        assert_eq!(values, vec![Some("1".to_string()), Some("2".to_string())]);
        assert_eq!(payload.len(), 2);
    }
}
