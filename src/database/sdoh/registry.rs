//! Data source registry repository
//!
//! The `data_sources` table records, per upstream source, where the data
//! comes from and when it was last loaded.

use crate::database::core::SourceName;
use crate::error::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row of the `data_sources` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceRecord {
    pub source_name: String,
    pub source_url: Option<String>,
    pub last_updated: Option<String>,
    pub update_frequency: Option<String>,
    pub description: Option<String>,
}

/// Repository for the source registry
pub struct DataSourceRepository<'a> {
    conn: &'a Connection,
}

impl<'a> DataSourceRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Set `last_updated` for one source
    ///
    /// Returns the number of registry rows touched; a source without a
    /// registry row is a no-op and yields 0.
    pub fn stamp(&self, source: SourceName, stamp: &str) -> Result<usize> {
        let updated = self.conn.execute(
            "UPDATE data_sources SET last_updated = ?1 WHERE source_name = ?2",
            rusqlite::params![stamp, source.as_str()],
        )?;
        Ok(updated)
    }

    /// All registry rows ordered by name
    pub fn list(&self) -> Result<Vec<DataSourceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_name, source_url, last_updated, update_frequency, description
             FROM data_sources ORDER BY source_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DataSourceRecord {
                source_name: row.get(0)?,
                source_url: row.get(1)?,
                last_updated: row.get(2)?,
                update_frequency: row.get(3)?,
                description: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Map of source name to its last load time
    pub fn last_updated_map(&self) -> Result<BTreeMap<String, Option<String>>> {
        Ok(self
            .list()?
            .into_iter()
            .map(|r| (r.source_name, r.last_updated))
            .collect())
    }

    /// Last load time of one source, `None` when never loaded or unknown
    pub fn last_updated(&self, source: SourceName) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT last_updated FROM data_sources WHERE source_name = ?1",
            [source.as_str()],
            |row| row.get::<_, Option<String>>(0),
        );

        match result {
            Ok(value) => Ok(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
