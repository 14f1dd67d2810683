use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLC observation as returned by a price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// One derived trading-day observation for one position.
///
/// `return_pct` is cumulative since purchase (close relative to the
/// position's buy price, not the prior day). Sequences are rebuilt in full
/// on every refresh and always sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,

    /// (close / buy_price - 1) * 100
    pub return_pct: f64,

    /// shares * close
    pub market_value: f64,

    /// True for the synthetic leading point injected when a position has
    /// only a single real observation. Pseudo points keep daily-delta
    /// lookbacks in range but are excluded from cross-position value sums.
    #[serde(default)]
    pub pseudo: bool,
}

impl PricePoint {
    /// Derive a real point from a bar for a position with the given
    /// buy price and share count.
    pub fn from_bar(bar: &Bar, buy_price: f64, shares: u32) -> Self {
        Self {
            date: bar.date,
            close: bar.close,
            high: bar.high,
            low: bar.low,
            return_pct: (bar.close / buy_price - 1.0) * 100.0,
            market_value: f64::from(shares) * bar.close,
            pseudo: false,
        }
    }

    /// The synthetic leading point: flat return, market value pinned to
    /// the capital invested, dated two days before `today`.
    pub fn pseudo(today: NaiveDate, buy_price: f64, shares: u32) -> Self {
        let value = f64::from(shares) * buy_price;
        Self {
            date: today - chrono::Duration::days(2),
            close: buy_price,
            high: buy_price,
            low: buy_price,
            return_pct: 0.0,
            market_value: value,
            pseudo: true,
        }
    }
}
