//! Nationwide SVI pull, one state at a time
//!
//! A failure in one state is logged and recorded in the summary; the pull
//! moves on to the next state.

use crate::database::SdohLoader;
use crate::error::Result;
use crate::normalize::RawPayload;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Anything that can produce the SVI payload for one state
pub trait SviSource {
    fn fetch_state(&self, state_fips: &str) -> Result<RawPayload>;
}

/// Progress information for a pull
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PullProgress {
    Started {
        total_states: usize,
    },
    StateLoaded {
        state_fips: String,
        records: usize,
    },
    StateFailed {
        state_fips: String,
        error: String,
    },
    Completed {
        total_records: usize,
        duration_secs: f64,
    },
}

/// Type alias for progress callback function
pub type PullProgressCallback = Arc<dyn Fn(PullProgress) + Send + Sync>;

/// Outcome of a pull
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullSummary {
    pub states_loaded: usize,
    pub total_records: usize,
    /// `(state_fips, error message)` for every state that failed
    pub failed_states: Vec<(String, String)>,
}

/// Fetch and load each state in `states`, pausing `delay` between requests
pub fn pull_all_states<S: SviSource>(
    source: &S,
    loader: &SdohLoader,
    states: &[&str],
    delay: Duration,
    callback: Option<PullProgressCallback>,
) -> PullSummary {
    let start = Instant::now();
    let mut summary = PullSummary::default();

    if let Some(ref cb) = callback {
        cb(PullProgress::Started {
            total_states: states.len(),
        });
    }

    for (idx, state_fips) in states.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        info!("Fetching SVI data for state FIPS {}", state_fips);
        match pull_state(source, loader, state_fips) {
            Ok(records) => {
                info!("Loaded {} census tracts for state {}", records, state_fips);
                summary.states_loaded += 1;
                summary.total_records += records;
                if let Some(ref cb) = callback {
                    cb(PullProgress::StateLoaded {
                        state_fips: state_fips.to_string(),
                        records,
                    });
                }
            }
            Err(e) => {
                warn!("Error processing state {}: {}", state_fips, e);
                summary
                    .failed_states
                    .push((state_fips.to_string(), e.to_string()));
                if let Some(ref cb) = callback {
                    cb(PullProgress::StateFailed {
                        state_fips: state_fips.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    info!(
        "Completed SVI pull: {} records from {} states, {} failed",
        summary.total_records,
        summary.states_loaded,
        summary.failed_states.len()
    );
    if let Some(ref cb) = callback {
        cb(PullProgress::Completed {
            total_records: summary.total_records,
            duration_secs: start.elapsed().as_secs_f64(),
        });
    }

    summary
}

fn pull_state<S: SviSource>(source: &S, loader: &SdohLoader, state_fips: &str) -> Result<usize> {
    let payload = source.fetch_state(state_fips)?;
    if payload.is_empty() {
        return Ok(0);
    }
    Ok(loader.load_svi(&payload)?.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::reset_schema;
    use crate::error::SdohError;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedSource;

    impl SviSource for CannedSource {
        fn fetch_state(&self, state_fips: &str) -> Result<RawPayload> {
            match state_fips {
                "02" => Err(SdohError::UpstreamFailure {
                    url: "https://example.invalid/query".to_string(),
                    status: 500,
                }),
                "04" => RawPayload::from_json(json!({"features": []})),
                _ => RawPayload::from_json(json!({
                    "features": [
                        {"attributes": {"FIPS": format!("{}001020100", state_fips), "RPL_THEMES": 0.5}},
                        {"attributes": {"FIPS": format!("{}001020200", state_fips), "RPL_THEMES": 0.6}}
                    ]
                })),
            }
        }
    }

    #[test]
    fn test_failed_state_does_not_stop_pull() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        reset_schema(&path, true).unwrap();
        let loader = SdohLoader::open(&path).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: PullProgressCallback = Arc::new(move |p: PullProgress| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(p);
            }
        });

        let summary = pull_all_states(
            &CannedSource,
            &loader,
            &["01", "02", "04", "05"],
            Duration::ZERO,
            Some(callback),
        );

        assert_eq!(summary.states_loaded, 3);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.failed_states.len(), 1);
        assert_eq!(summary.failed_states[0].0, "02");
        assert_eq!(loader.get_stats().unwrap().svi_data_count, 4);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], PullProgress::Started { total_states: 4 }));
        assert!(matches!(events[5], PullProgress::Completed { total_records: 4, .. }));
    }
}
