//! Read-only statistics over the store

use crate::database::core::{DatabaseConn, Table};
use crate::database::sdoh::registry::{DataSourceRecord, DataSourceRepository};
use crate::database::sdoh::open_guarded;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Row counts per table and the registry timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub svi_data_count: u64,
    pub adi_data_count: u64,
    pub places_data_count: u64,
    pub user_locations_count: u64,
    pub data_sources_count: u64,
    pub last_updated: BTreeMap<String, Option<String>>,
}

impl DatabaseStats {
    pub fn count(&self, table: Table) -> u64 {
        match table {
            Table::Svi => self.svi_data_count,
            Table::Adi => self.adi_data_count,
            Table::Places => self.places_data_count,
            Table::UserLocations => self.user_locations_count,
            Table::DataSources => self.data_sources_count,
        }
    }

    fn set_count(&mut self, table: Table, count: u64) {
        match table {
            Table::Svi => self.svi_data_count = count,
            Table::Adi => self.adi_data_count = count,
            Table::Places => self.places_data_count = count,
            Table::UserLocations => self.user_locations_count = count,
            Table::DataSources => self.data_sources_count = count,
        }
    }

    /// Rows gained per table since `earlier`
    pub fn added_since(&self, earlier: &DatabaseStats) -> Vec<(Table, u64)> {
        Table::ALL
            .iter()
            .map(|t| (*t, self.count(*t).saturating_sub(earlier.count(*t))))
            .collect()
    }
}

/// Aggregate reads against an initialized store
pub struct StatsService {
    db_path: PathBuf,
}

impl StatsService {
    /// Validate the store at `path` and remember it
    ///
    /// Fails with `NotFound` or `SchemaMissing`, same as the loader.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        open_guarded(&db_path)?;
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Count rows in every table and read the registry
    ///
    /// `adi_data` and `user_locations` are optional; when absent they count as 0.
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let db = open_guarded(&self.db_path)?;
        collect_stats(&db)
    }

    /// Full registry rows
    pub fn list_sources(&self) -> Result<Vec<DataSourceRecord>> {
        let db = open_guarded(&self.db_path)?;
        DataSourceRepository::new(&db.conn).list()
    }
}

pub(crate) fn collect_stats(db: &DatabaseConn) -> Result<DatabaseStats> {
    let mut stats = DatabaseStats::default();
    for table in Table::ALL {
        if db.table_exists(table.name())? {
            stats.set_count(table, db.table_count(table.name())?);
        }
    }
    stats.last_updated = DataSourceRepository::new(&db.conn).last_updated_map()?;
    Ok(stats)
}
