use serde::{Deserialize, Serialize};

/// Configuration for the dashboard core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Exchange suffix appended to tickers entered without one
    /// (e.g., "SI" turns "D05" into "D05.SI").
    pub exchange_suffix: String,

    /// How long a fetched series set stays fresh before the next
    /// aggregation refetches from providers.
    pub cache_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exchange_suffix: "SI".to_string(),
            cache_ttl_secs: 3600,
        }
    }
}
