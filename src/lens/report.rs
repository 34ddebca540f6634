//! Rendering of store contents for terminal output
//!
//! Each view is a flat row type deriving `Tabled`, so the same rows feed the
//! table, markdown, PSV and JSON-lines renderers.

use crate::database::{DataSourceRecord, DatabaseStats, LocationData, SviRecord, Table};
use crate::lens::utils::OutputFormat;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

/// A row that can be rendered in every [`OutputFormat`]
pub trait ReportRow: Serialize + Tabled + Clone {
    const PSV_HEADER: &'static str;

    fn psv_line(&self) -> String;
}

/// Render rows in the requested format
pub fn render_rows<T: ReportRow>(rows: &[T], format: OutputFormat) -> String {
    if let Some(table) = format.to_table(rows.iter().cloned()) {
        return table;
    }
    if format.is_json() {
        return json_or_empty(format.rows_to_json(rows));
    }

    let mut output = String::from(T::PSV_HEADER);
    for r in rows {
        output.push('\n');
        output.push_str(&r.psv_line());
    }
    output
}

fn json_or_empty(encoded: Result<Option<String>, serde_json::Error>) -> String {
    match encoded {
        Ok(json) => json.unwrap_or_default(),
        Err(e) => {
            warn!("Failed to encode output: {}", e);
            String::new()
        }
    }
}

fn opt_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_real(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Row count of one table
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TableCountRow {
    pub table: String,
    pub rows: u64,
}

impl ReportRow for TableCountRow {
    const PSV_HEADER: &'static str = "table|rows";

    fn psv_line(&self) -> String {
        format!("{}|{}", self.table, self.rows)
    }
}

/// Row counts before and after a load
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TableDeltaRow {
    pub table: String,
    pub before: u64,
    pub after: u64,
    pub added: u64,
}

impl ReportRow for TableDeltaRow {
    const PSV_HEADER: &'static str = "table|before|after|added";

    fn psv_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.table, self.before, self.after, self.added
        )
    }
}

/// One entry of the source registry
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SourceRow {
    pub source: String,
    pub last_updated: String,
    pub frequency: String,
    pub description: String,
    pub url: String,
}

impl ReportRow for SourceRow {
    const PSV_HEADER: &'static str = "source|last_updated|frequency|description|url";

    fn psv_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.source, self.last_updated, self.frequency, self.description, self.url
        )
    }
}

/// One PLACES measure of a location
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MeasureRow {
    pub measure_id: String,
    pub measure: String,
    pub value: String,
    pub ci_low: String,
    pub ci_high: String,
    pub year: String,
}

impl ReportRow for MeasureRow {
    const PSV_HEADER: &'static str = "measure_id|measure|value|ci_low|ci_high|year";

    fn psv_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.measure_id, self.measure, self.value, self.ci_low, self.ci_high, self.year
        )
    }
}

/// A labelled value, used for single-record views
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct FieldRow {
    pub field: String,
    pub value: String,
}

impl ReportRow for FieldRow {
    const PSV_HEADER: &'static str = "field|value";

    fn psv_line(&self) -> String {
        format!("{}|{}", self.field, self.value)
    }
}

impl FieldRow {
    fn new(field: &str, value: String) -> Self {
        Self {
            field: field.to_string(),
            value,
        }
    }
}

pub fn stats_rows(stats: &DatabaseStats) -> Vec<TableCountRow> {
    Table::ALL
        .iter()
        .map(|t| TableCountRow {
            table: t.name().to_string(),
            rows: stats.count(*t),
        })
        .collect()
}

pub fn delta_rows(before: &DatabaseStats, after: &DatabaseStats) -> Vec<TableDeltaRow> {
    after
        .added_since(before)
        .into_iter()
        .map(|(t, added)| TableDeltaRow {
            table: t.name().to_string(),
            before: before.count(t),
            after: after.count(t),
            added,
        })
        .collect()
}

/// Registry timestamps from a stats snapshot, "Never" for unloaded sources
pub fn last_updated_rows(stats: &DatabaseStats) -> Vec<FieldRow> {
    stats
        .last_updated
        .iter()
        .map(|(source, stamp)| {
            FieldRow::new(source, stamp.clone().unwrap_or_else(|| "Never".to_string()))
        })
        .collect()
}

pub fn source_rows(sources: &[DataSourceRecord]) -> Vec<SourceRow> {
    sources
        .iter()
        .map(|s| SourceRow {
            source: s.source_name.clone(),
            last_updated: s.last_updated.clone().unwrap_or_else(|| "Never".to_string()),
            frequency: opt_text(&s.update_frequency),
            description: opt_text(&s.description),
            url: opt_text(&s.source_url),
        })
        .collect()
}

pub fn svi_rows(svi: &SviRecord) -> Vec<FieldRow> {
    vec![
        FieldRow::new("fips", svi.fips.clone()),
        FieldRow::new("state", opt_text(&svi.state)),
        FieldRow::new("county", opt_text(&svi.county)),
        FieldRow::new("location", opt_text(&svi.location)),
        FieldRow::new("overall_svi", opt_real(svi.overall_svi)),
        FieldRow::new("socioeconomic_svi", opt_real(svi.socioeconomic_svi)),
        FieldRow::new("household_svi", opt_real(svi.household_svi)),
        FieldRow::new("minority_svi", opt_real(svi.minority_svi)),
        FieldRow::new("housing_transport_svi", opt_real(svi.housing_transport_svi)),
        FieldRow::new("last_updated", opt_text(&svi.last_updated)),
    ]
}

pub fn measure_rows(data: &LocationData) -> Vec<MeasureRow> {
    data.places
        .iter()
        .map(|p| MeasureRow {
            measure_id: p.measure_id.clone(),
            measure: opt_text(&p.measure),
            value: opt_real(p.data_value),
            ci_low: opt_real(p.confidence_limit_low),
            ci_high: opt_real(p.confidence_limit_high),
            year: opt_text(&p.year),
        })
        .collect()
}

/// Render a location lookup
///
/// JSON formats serialize the whole [`LocationData`]; the others print the
/// SVI block followed by the measures table.
pub fn render_location(data: &LocationData, format: OutputFormat) -> String {
    if format.is_json() {
        return json_or_empty(format.to_json(data));
    }
    if data.is_empty() {
        return format!(
            "No data found for {} {}",
            data.location_type, data.location_id
        );
    }

    let mut sections = Vec::new();
    if let Some(svi) = &data.svi {
        sections.push(format!("SVI\n{}", render_rows(&svi_rows(svi), format)));
    }
    if !data.places.is_empty() {
        sections.push(format!(
            "PLACES\n{}",
            render_rows(&measure_rows(data), format)
        ));
    }
    sections.join("\n\n")
}

/// Render table counts and registry timestamps
pub fn render_stats(stats: &DatabaseStats, format: OutputFormat) -> String {
    if format.is_json() {
        return json_or_empty(format.to_json(stats));
    }
    format!(
        "{}\n\nLast Updated Times\n{}",
        render_rows(&stats_rows(stats), format),
        render_rows(&last_updated_rows(stats), format)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PlacesRecord;
    use std::collections::BTreeMap;

    fn sample_location() -> LocationData {
        LocationData {
            location_id: "01001020100".to_string(),
            location_type: "tract".to_string(),
            svi: None,
            places: vec![PlacesRecord {
                location_id: "01001020100".to_string(),
                location_type: Some("tract".to_string()),
                measure_id: "CSMOKING".to_string(),
                measure: Some("Current smoking".to_string()),
                data_value: Some(18.2),
                confidence_limit_low: None,
                confidence_limit_high: None,
                year: Some("2021".to_string()),
                last_updated: None,
            }],
        }
    }

    #[test]
    fn test_psv_rendering() {
        let rows = measure_rows(&sample_location());
        assert_eq!(
            render_rows(&rows, OutputFormat::Psv),
            "measure_id|measure|value|ci_low|ci_high|year\nCSMOKING|Current smoking|18.2|||2021"
        );
    }

    #[test]
    fn test_json_line_rendering() {
        let rows = vec![
            TableCountRow {
                table: "svi_data".to_string(),
                rows: 2,
            },
            TableCountRow {
                table: "places_data".to_string(),
                rows: 0,
            },
        ];
        let output = render_rows(&rows, OutputFormat::JsonLine);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"table":"svi_data","rows":2}"#);
    }

    #[test]
    fn test_markdown_table() {
        let rows = vec![FieldRow::new("fips", "01001020100".to_string())];
        let output = render_rows(&rows, OutputFormat::Markdown);
        assert!(output.contains("| field"));
        assert!(output.contains("01001020100"));
    }

    #[test]
    fn test_render_empty_location() {
        let data = LocationData {
            location_id: "99999".to_string(),
            location_type: "county".to_string(),
            svi: None,
            places: vec![],
        };
        assert_eq!(
            render_location(&data, OutputFormat::Table),
            "No data found for county 99999"
        );
        assert!(render_location(&data, OutputFormat::Json).contains("\"places\":[]"));
    }

    #[test]
    fn test_stats_views() {
        let mut last_updated = BTreeMap::new();
        last_updated.insert("ADI".to_string(), None);
        last_updated.insert("CDC_SVI".to_string(), Some("2024-01-01T00:00:00Z".to_string()));
        let before = DatabaseStats {
            data_sources_count: 3,
            ..Default::default()
        };
        let after = DatabaseStats {
            svi_data_count: 7,
            data_sources_count: 3,
            last_updated,
            ..Default::default()
        };

        let deltas = delta_rows(&before, &after);
        assert_eq!(deltas.len(), 5);
        assert_eq!(deltas[0].table, "svi_data");
        assert_eq!(deltas[0].added, 7);

        let stamps = last_updated_rows(&after);
        assert_eq!(stamps[0].value, "Never");
        assert_eq!(stamps[1].value, "2024-01-01T00:00:00Z");

        assert!(render_stats(&after, OutputFormat::Json).contains("\"svi_data_count\":7"));
    }
}
