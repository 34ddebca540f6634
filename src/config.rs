use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Store file name used when `db_path` is not configured
pub const DEFAULT_DB_FILE: &str = "social_determinants.db";

const CONFIG_FILE: &str = "sdoh.toml";

pub struct SdohConfig {
    /// Directory holding the store and the config file
    pub data_dir: String,

    /// Path to the SQLite store
    pub db_path: String,

    /// Pause between consecutive upstream requests in multi-request pulls
    pub request_delay_secs: u64,

    /// Timeout applied to each upstream request
    pub request_timeout_secs: u64,

    /// Default `resultRecordCount` for SVI requests
    pub svi_record_limit: u32,

    /// Default `$limit` for PLACES requests
    pub places_record_limit: u32,

    /// Config file these settings were read from
    pub config_file: String,
}

const EMPTY_CONFIG: &str = r#"### sdoh configuration file

### directory holding the SQLite store
# data_dir = "~/.sdoh"

### SQLite store path, defaults to <data_dir>/social_determinants.db
# db_path = "~/.sdoh/social_determinants.db"

### upstream request settings
# request_delay_secs = 2        # pause between states in a full pull
# request_timeout_secs = 60
# svi_record_limit = 1000
# places_record_limit = 5000
"#;

impl Default for SdohConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        let data_dir = format!("{}/.sdoh", home_dir);

        Self {
            db_path: format!("{}/{}", data_dir, DEFAULT_DB_FILE),
            config_file: format!("{}/{}", data_dir, CONFIG_FILE),
            data_dir,
            request_delay_secs: 2,
            request_timeout_secs: 60,
            svi_record_limit: 1000,
            places_record_limit: 5000,
        }
    }
}

impl SdohConfig {
    /// Build the configuration from defaults, the TOML file and `SDOH_*`
    /// environment variables, in increasing priority
    pub fn new(path: &Option<String>) -> Result<SdohConfig> {
        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let sdoh_dir = format!("{}/.sdoh", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(sdoh_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create sdoh directory: {}", e))?;
                let p = format!("{}/{}", sdoh_dir.as_str(), CONFIG_FILE);
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // E.g., `SDOH_DB_PATH=/tmp/sdoh.db sdoh stats` points at another store
        builder = builder.add_source(config::Environment::with_prefix("SDOH"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let mut resolved = Self::from_map(&config, &home_dir)?;
        resolved.config_file = match path {
            Some(p) => p.clone(),
            None => format!("{}/{}", sdoh_dir, CONFIG_FILE),
        };
        Ok(resolved)
    }

    /// Resolve settings from flattened key/value pairs
    fn from_map(config: &HashMap<String, String>, home_dir: &str) -> Result<SdohConfig> {
        let defaults = SdohConfig::default();

        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p, home_dir),
            None => format!("{}/.sdoh", home_dir),
        };
        crate::database::ensure_data_dir(Path::new(&data_dir))?;

        let db_path = match config.get("db_path") {
            Some(p) => expand_home(p, home_dir),
            None => format!("{}/{}", data_dir.trim_end_matches('/'), DEFAULT_DB_FILE),
        };

        let request_delay_secs = config
            .get("request_delay_secs")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_delay_secs);

        let request_timeout_secs = config
            .get("request_timeout_secs")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let svi_record_limit = config
            .get("svi_record_limit")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.svi_record_limit);

        let places_record_limit = config
            .get("places_record_limit")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.places_record_limit);

        Ok(SdohConfig {
            config_file: format!("{}/.sdoh/{}", home_dir, CONFIG_FILE),
            data_dir,
            db_path,
            request_delay_secs,
            request_timeout_secs,
            svi_record_limit,
            places_record_limit,
        })
    }

    /// Path to the SQLite store
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("Store Path:         {}", self.db_path),
            format!("Request Delay:      {} seconds", self.request_delay_secs),
            format!("Request Timeout:    {} seconds", self.request_timeout_secs),
            format!("SVI Record Limit:   {}", self.svi_record_limit),
            format!("PLACES Record Limit: {}", self.places_record_limit),
        ]
        .join("\n")
    }
}

fn expand_home(p: &str, home_dir: &str) -> String {
    match p.strip_prefix("~/") {
        Some(rest) => format!("{}/{}", home_dir.trim_end_matches('/'), rest),
        None if p == "~" => home_dir.to_string(),
        None => p.to_string(),
    }
}

// =============================================================================
// Store info (used by the config command)
// =============================================================================

/// Information about the SQLite store on disk
#[derive(Debug, Serialize, Clone)]
pub struct StoreInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub schema: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_tables: Vec<String>,
}

/// Inspect the store without creating it
pub fn get_store_info(config: &SdohConfig) -> StoreInfo {
    use crate::database::{DatabaseConn, SchemaManager, SchemaStatus};

    let path = config.store_path();
    let exists = path.exists();
    let size_bytes = if exists {
        std::fs::metadata(&path).ok().map(|m| m.len())
    } else {
        None
    };

    let status = if exists {
        DatabaseConn::open_existing(&path)
            .and_then(|db| SchemaManager::new(&db.conn).check_status())
            .ok()
    } else {
        None
    };

    let (schema, missing_tables) = match status {
        Some(SchemaStatus::Ready) => ("ready".to_string(), vec![]),
        Some(SchemaStatus::Incomplete { missing }) => ("incomplete".to_string(), missing),
        Some(SchemaStatus::NotInitialized) => ("not initialized".to_string(), vec![]),
        None if exists => ("unreadable".to_string(), vec![]),
        None => ("not created".to_string(), vec![]),
    };

    StoreInfo {
        path: config.db_path.clone(),
        exists,
        size_bytes,
        schema,
        missing_tables,
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
