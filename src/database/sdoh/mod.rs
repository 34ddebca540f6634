//! Social determinants store: loader, repositories and stats
//!
//! [`SdohLoader`] and [`StatsService`] hold only the store path. Each
//! operation opens its own connection, checks the schema and drops the
//! connection before returning.

mod locations;
mod records;
mod registry;
mod stats;

pub use locations::{PlacesRepository, SviRepository};
pub use records::{
    current_stamp, PlacesRecord, RecordBatch, SviRecord, TableRecord, UserLocationRecord,
};
pub use registry::{DataSourceRecord, DataSourceRepository};
pub use stats::{DatabaseStats, StatsService};

use crate::database::core::{DatabaseConn, SchemaDefinitions};
use crate::error::{Result, SdohError};
use crate::normalize::{normalize_places, normalize_svi, RawPayload};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_affected: usize,
    pub registry_updated: bool,
}

/// Everything stored for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub location_id: String,
    pub location_type: String,
    pub svi: Option<SviRecord>,
    pub places: Vec<PlacesRecord>,
}

impl LocationData {
    pub fn is_empty(&self) -> bool {
        self.svi.is_none() && self.places.is_empty()
    }
}

/// Open an existing store and verify the required tables are present
pub(crate) fn open_guarded(path: &Path) -> Result<DatabaseConn> {
    let db = DatabaseConn::open_existing(path)?;
    for table in SchemaDefinitions::REQUIRED_TABLES {
        if !db.table_exists(table.name())? {
            return Err(SdohError::schema_missing(table.name()));
        }
    }
    Ok(db)
}

fn insert_sql<R: TableRecord>() -> String {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        R::TABLE.name(),
        R::COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

/// Writes normalized records into an initialized store
pub struct SdohLoader {
    db_path: PathBuf,
}

impl SdohLoader {
    /// Validate the store at `path` and remember it
    ///
    /// Never creates the file or the schema: a missing file gives
    /// `NotFound`, a missing table gives `SchemaMissing`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        open_guarded(&db_path)?;
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Insert-or-replace a batch and stamp its source in the registry
    ///
    /// Rows and the registry stamp commit together or not at all. An empty
    /// batch writes nothing.
    pub fn append_records<R: TableRecord>(&self, batch: &RecordBatch<R>) -> Result<LoadSummary> {
        if batch.is_empty() {
            info!("No records to append to {}", R::TABLE);
            return Ok(LoadSummary::default());
        }

        let db = open_guarded(&self.db_path)?;
        let tx = db.transaction()?;

        let sql = insert_sql::<R>();
        debug!("{}", sql);
        let mut rows_affected = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in &batch.records {
                rows_affected += stmt.execute(record.sql_params().as_slice())?;
            }
        }

        let registry_updated = match R::TABLE.source() {
            Some(source) => DataSourceRepository::new(&tx).stamp(source, &batch.stamp)? > 0,
            None => false,
        };

        tx.commit()?;

        info!("Appended {} rows to {}", rows_affected, R::TABLE);
        Ok(LoadSummary {
            rows_affected,
            registry_updated,
        })
    }

    /// Normalize an SVI payload and append it
    pub fn load_svi(&self, payload: &RawPayload) -> Result<LoadSummary> {
        let batch = normalize_svi(payload);
        info!("Normalized {} of {} SVI rows", batch.len(), payload.len());
        self.append_records(&batch)
    }

    /// Normalize a PLACES payload and append it
    pub fn load_places(&self, payload: &RawPayload) -> Result<LoadSummary> {
        let batch = normalize_places(payload);
        info!("Normalized {} of {} PLACES rows", batch.len(), payload.len());
        self.append_records(&batch)
    }

    /// Look up the SVI scores and PLACES measures for one location
    ///
    /// SVI is keyed by tract, so it is only consulted when `location_type`
    /// is `"tract"`.
    pub fn query_location(&self, location_id: &str, location_type: &str) -> Result<LocationData> {
        let db = open_guarded(&self.db_path)?;

        let svi = if location_type == "tract" {
            SviRepository::new(&db.conn).get(location_id)?
        } else {
            None
        };
        let places = PlacesRepository::new(&db.conn).find_by_location(location_id, location_type)?;

        Ok(LocationData {
            location_id: location_id.to_string(),
            location_type: location_type.to_string(),
            svi,
            places,
        })
    }

    /// Current table counts and registry timestamps
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let db = open_guarded(&self.db_path)?;
        stats::collect_stats(&db)
    }
}
