//! Error type for the sdoh library.
//!
//! The binary and the configuration layer report through `anyhow`; everything
//! below them returns [`SdohError`] so callers can tell a missing store apart
//! from a missing schema or a bad payload.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdohError {
    /// The store file or an input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The store exists but a required table is absent.
    #[error("required table '{table}' not found in database; run `sdoh setup` first")]
    SchemaMissing { table: String },

    /// The caller supplied no usable payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A remote endpoint answered with a non-success status.
    #[error("request to {url} failed with status code {status}")]
    UpstreamFailure { url: String, status: u16 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connection, timeout, body decode).
    #[error("http error: {0}")]
    Http(String),
}

impl SdohError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SdohError::InvalidInput(msg.into())
    }

    pub fn schema_missing(table: impl Into<String>) -> Self {
        SdohError::SchemaMissing {
            table: table.into(),
        }
    }
}

#[cfg(feature = "fetch")]
impl From<ureq::Error> for SdohError {
    fn from(e: ureq::Error) -> Self {
        SdohError::Http(e.to_string())
    }
}

pub type Result<T, E = SdohError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_missing_message() {
        let err = SdohError::schema_missing("svi_data");
        assert_eq!(
            err.to_string(),
            "required table 'svi_data' not found in database; run `sdoh setup` first"
        );
    }

    #[test]
    fn test_upstream_failure_message() {
        let err = SdohError::UpstreamFailure {
            url: "https://data.cdc.gov/resource/cwsq-ngmh.json".to_string(),
            status: 503,
        };
        assert!(err.to_string().ends_with("status code 503"));
    }
}
