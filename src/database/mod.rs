//! Database module
//!
//! This module provides all storage functionality for sdoh, organized into:
//!
//! - **core**: SQLite connection wrapper, table definitions and schema reset
//! - **sdoh**: the loader, per-table repositories and read-only statistics
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # Table definitions, SchemaManager, reset_schema
//! │
//! └── sdoh/           # Social determinants store
//!     ├── records     # Row types and the TableRecord trait
//!     ├── registry    # data_sources repository
//!     ├── locations   # svi_data / places_data repositories
//!     └── stats       # StatsService
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sdoh::database::{reset_schema, SdohLoader};
//! use sdoh::normalize::RawPayload;
//!
//! reset_schema(path, true)?;
//!
//! let loader = SdohLoader::open(path)?;
//! let payload = RawPayload::from_json(response)?;
//! let summary = loader.load_svi(&payload)?;
//!
//! let data = loader.query_location("01001020100", "tract")?;
//! ```

pub mod core;
pub mod sdoh;

// Connection and schema management
pub use core::{
    reset_schema, DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SourceName, Table,
};

// Loader, repositories and stats
pub use sdoh::{
    current_stamp, DataSourceRecord, DataSourceRepository, DatabaseStats, LoadSummary,
    LocationData, PlacesRecord, PlacesRepository, RecordBatch, SdohLoader, StatsService,
    SviRecord, SviRepository, TableRecord, UserLocationRecord,
};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &std::path::Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create data directory '{}': {}",
            data_dir.display(),
            e
        )
    })
}
