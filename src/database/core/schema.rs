//! Database schema management
//!
//! This module provides the table definitions for the social determinants
//! store and the [`SchemaManager`] that creates and resets them. Schema
//! creation is owned exclusively by this module: loaders only check that the
//! shape is present.

use crate::database::core::DatabaseConn;
use crate::error::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Destination tables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Svi,
    Adi,
    Places,
    UserLocations,
    DataSources,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Svi,
        Table::Adi,
        Table::Places,
        Table::UserLocations,
        Table::DataSources,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Svi => "svi_data",
            Table::Adi => "adi_data",
            Table::Places => "places_data",
            Table::UserLocations => "user_locations",
            Table::DataSources => "data_sources",
        }
    }

    /// Registry entry stamped when rows land in this table, if any
    pub fn source(&self) -> Option<SourceName> {
        match self {
            Table::Svi => Some(SourceName::CdcSvi),
            Table::Adi => Some(SourceName::Adi),
            Table::Places => Some(SourceName::CdcPlaces),
            Table::UserLocations | Table::DataSources => None,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The three recognized data sources in the `data_sources` registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "CDC_SVI")]
    CdcSvi,
    #[serde(rename = "ADI")]
    Adi,
    #[serde(rename = "CDC_PLACES")]
    CdcPlaces,
}

impl SourceName {
    pub const ALL: [SourceName; 3] = [SourceName::CdcSvi, SourceName::Adi, SourceName::CdcPlaces];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::CdcSvi => "CDC_SVI",
            SourceName::Adi => "ADI",
            SourceName::CdcPlaces => "CDC_PLACES",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            SourceName::CdcSvi => "https://onemap.cdc.gov/OneMapServices/rest/services/SVI/CDC_ATSDR_Social_Vulnerability_Index_2020_USA/MapServer",
            SourceName::Adi => "https://www.neighborhoodatlas.medicine.wisc.edu/",
            SourceName::CdcPlaces => "https://data.cdc.gov/api",
        }
    }

    pub fn update_frequency(&self) -> &'static str {
        match self {
            SourceName::CdcSvi => "Annual",
            SourceName::Adi => "Variable",
            SourceName::CdcPlaces => "Annual",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceName::CdcSvi => "CDC/ATSDR Social Vulnerability Index data",
            SourceName::Adi => "Area Deprivation Index from Neighborhood Atlas",
            SourceName::CdcPlaces => "CDC PLACES health indicators",
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema definitions for all tables in the store
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Social Vulnerability Index, one row per census tract
    pub const SVI_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS svi_data (
            fips TEXT PRIMARY KEY,
            state TEXT,
            county TEXT,
            location TEXT,
            overall_svi REAL,
            socioeconomic_svi REAL,
            household_svi REAL,
            minority_svi REAL,
            housing_transport_svi REAL,
            last_updated TEXT
        );
    "#;

    /// Area Deprivation Index, one row per block group
    pub const ADI_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS adi_data (
            block_group_id TEXT PRIMARY KEY,
            state TEXT,
            county TEXT,
            adi_national_rank INTEGER,
            adi_state_rank INTEGER,
            adi_national_decile INTEGER,
            last_updated TEXT
        );
    "#;

    /// CDC PLACES measures, one row per (location, measure)
    pub const PLACES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS places_data (
            location_id TEXT,
            location_type TEXT,
            measure_id TEXT,
            measure TEXT,
            data_value REAL,
            confidence_limit_low REAL,
            confidence_limit_high REAL,
            year TEXT,
            last_updated TEXT,
            PRIMARY KEY (location_id, measure_id)
        );
    "#;

    pub const USER_LOCATIONS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS user_locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT,
            location_name TEXT,
            address TEXT,
            latitude REAL,
            longitude REAL,
            census_tract TEXT,
            block_group TEXT,
            zcta TEXT,
            created_date TEXT,
            FOREIGN KEY (census_tract) REFERENCES svi_data(fips),
            FOREIGN KEY (block_group) REFERENCES adi_data(block_group_id)
        );
    "#;

    /// Registry of data sources and when each was last loaded
    pub const DATA_SOURCES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS data_sources (
            source_name TEXT PRIMARY KEY,
            source_url TEXT,
            last_updated TEXT,
            update_frequency TEXT,
            description TEXT
        );
    "#;

    pub const INDEXES: &'static [&'static str] = &[
        "CREATE INDEX IF NOT EXISTS idx_svi_state ON svi_data(state)",
        "CREATE INDEX IF NOT EXISTS idx_svi_county ON svi_data(county)",
        "CREATE INDEX IF NOT EXISTS idx_adi_state ON adi_data(state)",
        "CREATE INDEX IF NOT EXISTS idx_adi_county ON adi_data(county)",
        "CREATE INDEX IF NOT EXISTS idx_places_measure_id ON places_data(measure_id)",
        "CREATE INDEX IF NOT EXISTS idx_places_location_type ON places_data(location_type)",
    ];

    /// Tables a loader refuses to run without
    pub const REQUIRED_TABLES: [Table; 3] = [Table::Svi, Table::Places, Table::DataSources];

    pub fn all_tables() -> [(Table, &'static str); 5] {
        [
            (Table::Svi, Self::SVI_TABLE),
            (Table::Adi, Self::ADI_TABLE),
            (Table::Places, Self::PLACES_TABLE),
            (Table::UserLocations, Self::USER_LOCATIONS_TABLE),
            (Table::DataSources, Self::DATA_SOURCES_TABLE),
        ]
    }
}

/// Schema manager for the store
///
/// Works on a borrowed connection so it can run inside a caller's transaction.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create all tables and indexes and seed the source registry
    pub fn initialize(&self) -> Result<()> {
        for (table, sql) in SchemaDefinitions::all_tables() {
            info!("Creating {} table", table);
            self.conn.execute(sql, [])?;
        }

        for index_sql in SchemaDefinitions::INDEXES {
            self.conn.execute(index_sql, [])?;
        }

        self.seed_sources()?;
        Ok(())
    }

    /// Insert the three known sources with null timestamps
    fn seed_sources(&self) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO data_sources (source_name, source_url, last_updated, update_frequency, description)
             VALUES (?1, ?2, NULL, ?3, ?4)",
        )?;

        for source in SourceName::ALL {
            stmt.execute(rusqlite::params![
                source.as_str(),
                source.url(),
                source.update_frequency(),
                source.description(),
            ])?;
        }
        Ok(())
    }

    /// List user tables, skipping SQLite's internal ones
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND substr(name, 1, 7) <> 'sqlite_' ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// List user-created indexes (automatic primary-key indexes excluded)
    pub fn list_indexes(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='index' AND sql IS NOT NULL ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Drop every user table
    pub fn drop_user_tables(&self) -> Result<Vec<String>> {
        let tables = self.list_tables()?;
        for table in &tables {
            info!("Dropping table: {}", table);
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS \"{}\"", table), [])?;
        }
        Ok(tables)
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        let existing = self.list_tables()?;
        let missing: Vec<String> = Table::ALL
            .iter()
            .map(|t| t.name())
            .filter(|name| !existing.iter().any(|e| e == name))
            .map(str::to_string)
            .collect();

        if missing.len() == Table::ALL.len() {
            Ok(SchemaStatus::NotInitialized)
        } else if missing.is_empty() {
            Ok(SchemaStatus::Ready)
        } else {
            Ok(SchemaStatus::Incomplete { missing })
        }
    }
}

/// Status of the store schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SchemaStatus {
    /// None of the tables exist (fresh or foreign database)
    NotInitialized,

    /// All five tables exist
    Ready,

    /// Some tables are missing
    Incomplete { missing: Vec<String> },
}

/// Create or reset the store at `path`
///
/// Creates the parent directory and the file when absent. With
/// `drop_existing`, every user table is dropped first. Table creation,
/// index creation and registry seeding happen in one transaction.
pub fn reset_schema(path: &Path, drop_existing: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = DatabaseConn::open_or_create(path)?;
    let tx = db.transaction()?;
    {
        let schema = SchemaManager::new(&tx);
        let existing = schema.list_tables()?;
        info!("Existing tables: {:?}", existing);

        if drop_existing && !existing.is_empty() {
            schema.drop_user_tables()?;
        }

        schema.initialize()?;
    }
    tx.commit()?;

    info!("Database setup complete at: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("social_determinants.db")
    }

    #[test]
    fn test_schema_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_or_create(&store_path(&dir)).unwrap();
        let manager = SchemaManager::new(&db.conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_reset_creates_tables_indexes_and_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        reset_schema(&path, true).unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        let manager = SchemaManager::new(&db.conn);

        assert_eq!(
            manager.list_tables().unwrap(),
            vec![
                "adi_data",
                "data_sources",
                "places_data",
                "svi_data",
                "user_locations"
            ]
        );
        assert_eq!(
            manager.list_indexes().unwrap(),
            vec![
                "idx_adi_county",
                "idx_adi_state",
                "idx_places_location_type",
                "idx_places_measure_id",
                "idx_svi_county",
                "idx_svi_state"
            ]
        );
        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Ready);

        let rows: Vec<(String, Option<String>)> = {
            let mut stmt = db
                .conn
                .prepare("SELECT source_name, last_updated FROM data_sources ORDER BY source_name")
                .unwrap();
            let collected: Vec<(String, Option<String>)> = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .unwrap()
                .map(|r| r.unwrap())
                .collect();
            collected
        };
        assert_eq!(
            rows,
            vec![
                ("ADI".to_string(), None),
                ("CDC_PLACES".to_string(), None),
                ("CDC_SVI".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_reset_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.db");

        reset_schema(&path, true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reset_fails_when_directory_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = reset_schema(&blocker.join("store.db"), true);
        assert!(matches!(result, Err(crate::error::SdohError::Io(_))));
    }

    #[test]
    fn test_reset_drops_existing_data_and_foreign_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        reset_schema(&path, true).unwrap();

        {
            let db = DatabaseConn::open_existing(&path).unwrap();
            db.execute("INSERT INTO svi_data (fips) VALUES ('01001020100')")
                .unwrap();
            db.execute("UPDATE data_sources SET last_updated = 'x'")
                .unwrap();
            db.execute("CREATE TABLE places_smoking_data (locationid TEXT)")
                .unwrap();
        }

        reset_schema(&path, true).unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        assert_eq!(db.table_count("svi_data").unwrap(), 0);
        assert!(!db.table_exists("places_smoking_data").unwrap());
        let stamped: u64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM data_sources WHERE last_updated IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stamped, 0);
    }

    #[test]
    fn test_reset_drops_tables_with_sqlite_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        reset_schema(&path, true).unwrap();

        {
            let db = DatabaseConn::open_existing(&path).unwrap();
            db.execute("CREATE TABLE sqlitexdata (id INTEGER)").unwrap();
            let manager = SchemaManager::new(&db.conn);
            assert!(manager
                .list_tables()
                .unwrap()
                .contains(&"sqlitexdata".to_string()));
            // AUTOINCREMENT bookkeeping stays hidden
            assert!(!manager
                .list_tables()
                .unwrap()
                .contains(&"sqlite_sequence".to_string()));
        }

        reset_schema(&path, true).unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        let manager = SchemaManager::new(&db.conn);
        assert_eq!(
            manager.list_tables().unwrap(),
            vec![
                "adi_data",
                "data_sources",
                "places_data",
                "svi_data",
                "user_locations"
            ]
        );
    }

    #[test]
    fn test_reset_with_user_location_referencing_tract() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        reset_schema(&path, true).unwrap();

        {
            let db = DatabaseConn::open_existing(&path).unwrap();
            db.execute("INSERT INTO svi_data (fips) VALUES ('01001020100')")
                .unwrap();
            db.execute(
                "INSERT INTO user_locations (user_id, census_tract, block_group) \
                 VALUES ('u1', '01001020100', '010010201001')",
            )
            .unwrap();
            // a tract that was never loaded is accepted too
            db.execute(
                "INSERT INTO user_locations (user_id, census_tract) VALUES ('u2', '99999999999')",
            )
            .unwrap();
        }

        reset_schema(&path, true).unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        assert_eq!(db.table_count("user_locations").unwrap(), 0);
        assert_eq!(db.table_count("svi_data").unwrap(), 0);
    }

    #[test]
    fn test_reset_keep_existing_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        reset_schema(&path, true).unwrap();

        {
            let db = DatabaseConn::open_existing(&path).unwrap();
            db.execute("INSERT INTO svi_data (fips) VALUES ('01001020100')")
                .unwrap();
        }

        reset_schema(&path, false).unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        assert_eq!(db.table_count("svi_data").unwrap(), 1);
        assert_eq!(db.table_count("data_sources").unwrap(), 3);
    }

    #[test]
    fn test_check_status_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_or_create(&store_path(&dir)).unwrap();
        db.execute(SchemaDefinitions::SVI_TABLE).unwrap();

        let manager = SchemaManager::new(&db.conn);
        match manager.check_status().unwrap() {
            SchemaStatus::Incomplete { missing } => {
                assert_eq!(missing.len(), 4);
                assert!(!missing.contains(&"svi_data".to_string()));
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_table_sources() {
        assert_eq!(Table::Svi.source(), Some(SourceName::CdcSvi));
        assert_eq!(Table::Places.source(), Some(SourceName::CdcPlaces));
        assert_eq!(Table::Adi.source(), Some(SourceName::Adi));
        assert_eq!(Table::UserLocations.source(), None);
    }
}
