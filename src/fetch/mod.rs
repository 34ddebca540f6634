//! HTTP fetch layer for the CDC endpoints
//!
//! [`FetchClient`] wraps one `ureq` agent configured with a global timeout.
//! Status handling happens here: a non-success status becomes
//! [`SdohError::UpstreamFailure`] and only parsed payloads leave this module.

pub mod places;
pub mod pull;
pub mod svi;

pub use places::{PlacesQuery, DEFAULT_MEASURES, EXTENDED_MEASURES, PLACES_URL};
pub use pull::{pull_all_states, PullProgress, PullProgressCallback, PullSummary, SviSource};
pub use svi::{SviQuery, STATE_FIPS_CODES, SVI_FIELDS, SVI_QUERY_URL};

use crate::error::{Result, SdohError};
use crate::normalize::RawPayload;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Largest response body accepted from an upstream endpoint
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Blocking client for the SVI and PLACES endpoints
pub struct FetchClient {
    agent: ureq::Agent,
}

impl FetchClient {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// GET `url` with query parameters and parse the body as JSON
    pub fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value> {
        debug!("GET {} {:?}", url, params);

        let mut response = self
            .agent
            .get(url)
            .query_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .call()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdohError::UpstreamFailure {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let value = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_json::<Value>()?;
        Ok(value)
    }

    /// Fetch SVI tracts matching `query`
    pub fn fetch_svi(&self, query: &SviQuery) -> Result<RawPayload> {
        let value = self.get_json(SVI_QUERY_URL, &query.params())?;
        RawPayload::from_json(value)
    }

    /// Fetch PLACES estimates matching `query`
    pub fn fetch_places(&self, query: &PlacesQuery) -> Result<RawPayload> {
        let value = self.get_json(PLACES_URL, &query.params())?;
        RawPayload::from_json(value)
    }
}

impl SviSource for FetchClient {
    fn fetch_state(&self, state_fips: &str) -> Result<RawPayload> {
        self.fetch_svi(&SviQuery::full_state(state_fips))
    }
}
