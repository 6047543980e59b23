//! Incident reporting handlers and sweeps.
//!
//! Reports are public hazards with a location and a severity. Every incident
//! carries an expiry; an external scheduler drives the expiration and cleanup
//! sweeps through the `/jobs/*` endpoints, so no background task is needed.

pub(crate) mod list;
pub(crate) mod report;
mod storage;
pub(crate) mod sweep;
pub(crate) mod types;


const DEFAULT_INCIDENT_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Incident lifecycle configuration shared by report and sweep handlers.
#[derive(Clone, Debug)]
pub struct IncidentConfig {
    ttl_seconds: i64,
}

impl IncidentConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl_seconds: DEFAULT_INCIDENT_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self::new()
    }
}
