pub mod config;
pub mod load;
pub mod pull;
pub mod query;
pub mod setup;
pub mod sources;
pub mod stats;

use sdoh::lens::utils::OutputFormat;
use sdoh::{SdohConfig, SdohLoader, StatsService};
use serde::Serialize;

/// Open the configured store as a loader, exiting on failure
pub(crate) fn open_loader(config: &SdohConfig) -> SdohLoader {
    match SdohLoader::open(config.store_path()) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

/// Open the configured store for reads, exiting on failure
pub(crate) fn open_stats(config: &SdohConfig) -> StatsService {
    match StatsService::open(config.store_path()) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a value as JSON in the requested variant
pub(crate) fn print_json<T: Serialize>(value: &T, format: OutputFormat) {
    match format.to_json(value) {
        Ok(Some(json)) => println!("{}", json),
        Ok(None) => {}
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}
