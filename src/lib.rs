#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! sdoh - social determinants of health data loader
//!
//! sdoh pulls the CDC/ATSDR Social Vulnerability Index and CDC PLACES health
//! measures from their public APIs, normalizes them into fixed row shapes and
//! stores them in a local SQLite file for lookups by location. It can be used
//! as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (core) | Schema, normalizer, loader, stats | `rusqlite`, `csv`, `serde_json` |
//! | `fetch` | HTTP clients for the SVI and PLACES endpoints | `ureq` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | The `sdoh` binary | All above + `clap`, `indicatif` |
//!
//! # Architecture
//!
//! - **[`database`]**: store connection, schema reset, loader, stats
//! - **[`normalize`]**: payload shape detection and per-table row mapping
//! - **[`fetch`]**: upstream HTTP requests and the nationwide SVI pull
//!   (requires `fetch`)
//! - **[`lens`]**: output formats and rendering
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sdoh::database::{reset_schema, SdohLoader};
//! use sdoh::normalize::RawPayload;
//!
//! let path = std::path::Path::new("social_determinants.db");
//! reset_schema(path, true)?;
//!
//! let loader = SdohLoader::open(path)?;
//! let payload = RawPayload::from_csv_path("svi_alabama.csv".as_ref())?;
//! let summary = loader.load_svi(&payload)?;
//! println!("loaded {} tracts", summary.rows_affected);
//!
//! let data = loader.query_location("01001020100", "tract")?;
//! for measure in &data.places {
//!     println!("{}: {:?}", measure.measure_id, measure.data_value);
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod lens;
pub mod normalize;

#[cfg(feature = "fetch")]
pub mod fetch;

// =============================================================================
// Configuration and errors (always available)
// =============================================================================

pub use config::SdohConfig;
pub use error::{Result, SdohError};

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

pub use database::{
    reset_schema, DatabaseConn, DatabaseStats, LoadSummary, LocationData, PlacesRecord,
    RecordBatch, SchemaStatus, SdohLoader, SourceName, StatsService, SviRecord, Table,
    TableRecord, UserLocationRecord,
};

// =============================================================================
// Normalizer
// =============================================================================

pub use normalize::{normalize_places, normalize_svi, RawPayload};

// =============================================================================
// Lens Module
// =============================================================================

pub use lens::utils::OutputFormat;

// =============================================================================
// Fetch Module - requires "fetch" feature
// =============================================================================

#[cfg(feature = "fetch")]
pub use fetch::{FetchClient, PlacesQuery, SviQuery};
