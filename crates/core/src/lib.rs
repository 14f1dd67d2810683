pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;

use chrono::NaiveDate;
use std::collections::HashMap;

use errors::{CoreError, ValidationError};
use models::cache::{ledger_fingerprint, SeriesCache};
use models::position::{Position, PositionInput, UpsertOutcome};
use models::series::PricePoint;
use models::settings::Settings;
use models::view::{AggregatedView, Filters};
use providers::registry::ProviderRegistry;
use services::aggregator::PortfolioAggregator;
use services::validator::PositionValidator;
use store::traits::PositionStore;

/// Main entry point for the portfolio dashboard core.
///
/// Owns the ledger snapshot, the position store, the price providers, and
/// the series cache. Each interaction (aggregate, add, close, remove) works
/// against the current snapshot; writes persist the whole table back to the
/// store and naturally invalidate the cache through the ledger fingerprint.
#[must_use]
pub struct PortfolioDashboard {
    store: Box<dyn PositionStore>,
    providers: ProviderRegistry,
    settings: Settings,
    validator: PositionValidator,
    aggregator: PortfolioAggregator,
    ledger: Vec<Position>,
    cache: Option<SeriesCache>,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("positions", &self.ledger.len())
            .field("settings", &self.settings)
            .field(
                "cached_points",
                &self.cache.as_ref().map_or(0, SeriesCache::total_points),
            )
            .finish()
    }
}

impl PortfolioDashboard {
    /// Open a dashboard over the given store with default settings and
    /// the default provider stack (Yahoo Finance primary, Stooq fallback).
    pub fn open(store: Box<dyn PositionStore>) -> Result<Self, CoreError> {
        Self::with_parts(store, ProviderRegistry::with_defaults(), Settings::default())
    }

    /// Open with explicit providers and settings. Reads the ledger once;
    /// use [`reload`](Self::reload) to pick up external store edits.
    pub fn with_parts(
        store: Box<dyn PositionStore>,
        providers: ProviderRegistry,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        let ledger = store.read()?;
        Ok(Self {
            store,
            providers,
            settings,
            validator: PositionValidator::new(),
            aggregator: PortfolioAggregator::new(),
            ledger,
            cache: None,
        })
    }

    // ── Ledger access ───────────────────────────────────────────────

    /// The current ledger snapshot, in stored row order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.ledger
    }

    /// Look up a single position by its key.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<&Position> {
        self.ledger.iter().find(|p| p.key == key)
    }

    /// All position keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.ledger.iter().map(|p| p.key.clone()).collect();
        keys.sort_unstable();
        keys
    }

    /// Re-read the ledger from the store, discarding the local snapshot.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.ledger = self.store.read()?;
        Ok(())
    }

    // ── Write path ──────────────────────────────────────────────────

    /// Validate raw form input and commit it to the store.
    ///
    /// Inserts a new open row, or — when the computed key already exists —
    /// overwrites that row's shares and buy price in place. The returned
    /// [`UpsertOutcome::Replaced`] carries the previous values so the
    /// caller can surface a warning. Nothing is written on rejection.
    pub async fn add_position(&mut self, input: &PositionInput) -> Result<UpsertOutcome, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let validated = self
            .validator
            .validate(input, &self.settings, &self.providers, today)
            .await?;
        let new = validated.position;

        let mut rows = self.ledger.clone();
        let outcome = match rows.iter_mut().find(|p| p.key == new.key) {
            Some(existing) => {
                let outcome = UpsertOutcome::Replaced {
                    previous_shares: existing.shares,
                    previous_price: existing.buy_price,
                };
                existing.shares = new.shares;
                existing.buy_price = new.buy_price;
                outcome
            }
            None => {
                rows.push(new);
                UpsertOutcome::Inserted
            }
        };

        self.store.update(&rows)?;
        self.ledger = rows;
        Ok(outcome)
    }

    /// Mark a position as sold. Requires a close date on or after the buy
    /// date and a positive close price.
    pub async fn close_position(
        &mut self,
        key: &str,
        close_date: NaiveDate,
        close_price: f64,
    ) -> Result<(), CoreError> {
        let mut rows = self.ledger.clone();
        let position = rows
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| CoreError::PositionNotFound(key.to_string()))?;

        if !close_price.is_finite() || close_price <= 0.0 {
            return Err(ValidationError::NonPositiveClosePrice.into());
        }
        if close_date < position.buy_date {
            return Err(ValidationError::CloseBeforeBuy {
                close_date,
                buy_date: position.buy_date,
            }
            .into());
        }

        position.closed = true;
        position.close_date = Some(close_date);
        position.close_price = Some(close_price);

        self.store.update(&rows)?;
        self.ledger = rows;
        Ok(())
    }

    /// Remove a position row entirely. Returns the removed row.
    pub fn remove_position(&mut self, key: &str) -> Result<Position, CoreError> {
        let idx = self
            .ledger
            .iter()
            .position(|p| p.key == key)
            .ok_or_else(|| CoreError::PositionNotFound(key.to_string()))?;

        let mut rows = self.ledger.clone();
        let removed = rows.remove(idx);
        self.store.update(&rows)?;
        self.ledger = rows;
        Ok(removed)
    }

    // ── Aggregation ─────────────────────────────────────────────────

    /// Compute the full dashboard view for the given filters.
    ///
    /// Reuses the cached price series when the ledger is unchanged and the
    /// cache is younger than the configured TTL; otherwise fetches every
    /// position's window from the providers first.
    pub async fn aggregate(&mut self, filters: &Filters) -> Result<AggregatedView, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let series = self.current_series(today).await?;
        Ok(self.aggregator.aggregate(&self.ledger, &series, filters, today))
    }

    /// Force a refetch of all price series, ignoring the cache TTL.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        let today = chrono::Utc::now().date_naive();
        let series = self.fetch_all_series(today).await?;
        self.cache = Some(SeriesCache::new(ledger_fingerprint(&self.ledger), series));
        Ok(())
    }

    /// Number of price points currently cached.
    #[must_use]
    pub fn cached_points(&self) -> usize {
        self.cache.as_ref().map_or(0, SeriesCache::total_points)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set the exchange suffix appended to bare tickers (e.g., "SI").
    pub fn set_exchange_suffix(&mut self, suffix: impl Into<String>) {
        self.settings.exchange_suffix = suffix.into().to_uppercase();
    }

    /// Set how long fetched series stay fresh, in seconds.
    pub fn set_cache_ttl_secs(&mut self, ttl_secs: u64) {
        self.settings.cache_ttl_secs = ttl_secs;
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Cached series if still scoped to this ledger and within TTL,
    /// freshly fetched otherwise.
    async fn current_series(
        &mut self,
        today: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, CoreError> {
        let fingerprint = ledger_fingerprint(&self.ledger);
        if let Some(cache) = &self.cache {
            if cache.is_fresh(fingerprint, self.settings.cache_ttl_secs, chrono::Utc::now()) {
                return Ok(cache.series().clone());
            }
        }

        let series = self.fetch_all_series(today).await?;
        self.cache = Some(SeriesCache::new(fingerprint, series.clone()));
        Ok(series)
    }

    /// Fetch and derive the price-point series for every ledger row.
    ///
    /// Open positions fetch `[buy_date, today]`, closed ones stop at their
    /// close date. An empty fetch result leaves the key out of the map —
    /// that position is simply absent from the aggregates. Provider errors
    /// (all sources down) abort the interaction.
    async fn fetch_all_series(
        &self,
        today: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, CoreError> {
        let mut series = HashMap::new();

        for position in &self.ledger {
            let end = if position.closed {
                position.close_date.unwrap_or(today)
            } else {
                today
            };

            let bars = self
                .providers
                .fetch_daily(&position.ticker, position.buy_date, end)
                .await?;
            if bars.is_empty() {
                continue;
            }

            let points = self.aggregator.build_series(position, &bars, today);
            series.insert(position.key.clone(), points);
        }

        Ok(series)
    }
}
