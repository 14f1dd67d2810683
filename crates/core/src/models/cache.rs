use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hasher;

use super::position::Position;
use super::series::PricePoint;

/// Fetched per-position series, scoped to one ledger state.
///
/// The cache is keyed by a fingerprint of the ledger it was computed from:
/// any write changes the fingerprint, so stale series can never be served
/// against a modified ledger. A time-to-live bounds how long prices are
/// reused for an unchanged ledger; an expired cache only means slightly
/// old prices, never a corrupted view.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    fingerprint: u64,
    fetched_at: DateTime<Utc>,
    series: HashMap<String, Vec<PricePoint>>,
}

impl SeriesCache {
    pub fn new(fingerprint: u64, series: HashMap<String, Vec<PricePoint>>) -> Self {
        Self {
            fingerprint,
            fetched_at: Utc::now(),
            series,
        }
    }

    /// Usable iff the ledger hasn't changed and the TTL hasn't elapsed.
    pub fn is_fresh(&self, fingerprint: u64, ttl_secs: u64, now: DateTime<Utc>) -> bool {
        self.fingerprint == fingerprint
            && now.signed_duration_since(self.fetched_at).num_seconds() < ttl_secs as i64
    }

    pub fn series(&self) -> &HashMap<String, Vec<PricePoint>> {
        &self.series
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Total number of cached price points across all positions.
    pub fn total_points(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// Order-sensitive hash over every position's identity fields.
/// Two ledgers with the same rows in the same order fingerprint equal.
pub fn ledger_fingerprint(positions: &[Position]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hasher.write_usize(positions.len());
    for position in positions {
        position.hash_identity(&mut hasher);
    }
    hasher.finish()
}
