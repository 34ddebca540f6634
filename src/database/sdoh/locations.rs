//! Read access to the SVI and PLACES tables

use crate::database::sdoh::records::{PlacesRecord, SviRecord};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Repository for `svi_data`
pub struct SviRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SviRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look up one tract by FIPS code
    pub fn get(&self, fips: &str) -> Result<Option<SviRecord>> {
        let sql = format!(
            "SELECT {} FROM svi_data WHERE fips = ?1",
            SviRecord::SELECT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, [fips], SviRecord::from_row)
            .optional()?)
    }
}

/// Repository for `places_data`
pub struct PlacesRepository<'a> {
    conn: &'a Connection,
}

impl<'a> PlacesRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All measures for a location, ordered by measure id
    pub fn find_by_location(
        &self,
        location_id: &str,
        location_type: &str,
    ) -> Result<Vec<PlacesRecord>> {
        let sql = format!(
            "SELECT {} FROM places_data
             WHERE location_id = ?1 AND location_type = ?2
             ORDER BY measure_id",
            PlacesRecord::SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([location_id, location_type], PlacesRecord::from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{reset_schema, DatabaseConn};

    fn seeded_store(dir: &tempfile::TempDir) -> DatabaseConn {
        let path = dir.path().join("store.db");
        reset_schema(&path, true).unwrap();
        let db = DatabaseConn::open_existing(&path).unwrap();
        db.execute(
            "INSERT INTO svi_data (fips, state, county, overall_svi) VALUES
             ('01001020100', '01', 'Autauga', 0.42),
             ('01001020200', '01', 'Autauga', NULL),
             ('02013000100', '02', 'Aleutians East', 0.9)",
        )
        .unwrap();
        db.execute(
            "INSERT INTO places_data (location_id, location_type, measure_id, data_value) VALUES
             ('01001020100', 'tract', 'OBESITY', 35.1),
             ('01001020100', 'tract', 'CSMOKING', 18.2),
             ('01001', 'county', 'CSMOKING', 17.0)",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_svi_get() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_store(&dir);
        let repo = SviRepository::new(&db.conn);

        let record = repo.get("01001020100").unwrap().unwrap();
        assert_eq!(record.overall_svi, Some(0.42));
        assert_eq!(record.county.as_deref(), Some("Autauga"));
        assert!(repo.get("99999999999").unwrap().is_none());
    }

    #[test]
    fn test_svi_null_score() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_store(&dir);
        let repo = SviRepository::new(&db.conn);

        let record = repo.get("01001020200").unwrap().unwrap();
        assert_eq!(record.overall_svi, None);
        assert_eq!(record.state.as_deref(), Some("01"));
    }

    #[test]
    fn test_places_ordered_by_measure() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_store(&dir);
        let repo = PlacesRepository::new(&db.conn);

        let records = repo.find_by_location("01001020100", "tract").unwrap();
        let measures: Vec<&str> = records.iter().map(|r| r.measure_id.as_str()).collect();
        assert_eq!(measures, vec!["CSMOKING", "OBESITY"]);

        assert!(repo
            .find_by_location("01001020100", "county")
            .unwrap()
            .is_empty());
    }
}
