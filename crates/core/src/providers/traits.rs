use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::series::Bar;

/// Trait abstraction for daily price-history providers.
///
/// Each market-data source implements this trait. If one source stops
/// working or changes its API, only that implementation is replaced —
/// the rest of the codebase is untouched.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Human-readable name of this provider (for errors).
    fn name(&self) -> &str;

    /// Fetch daily OHLC bars for `ticker` over `[from, to]`, inclusive,
    /// sorted ascending by date.
    ///
    /// An empty Vec is the defined answer for an unknown ticker or a
    /// non-trading range — providers must not turn "no data" into an error.
    async fn fetch_daily(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Bar>, CoreError>;
}
