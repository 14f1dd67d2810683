use thiserror::Error;

/// Unified error type for the portfolio-dashboard-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store ───────────────────────────────────────────────────────
    #[error("Store error: {0}")]
    Store(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price provider configured")]
    NoProvider,

    // ── Business Logic ──────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One variant per rejection reason on the add/edit path. The validator
/// short-circuits, so a single submission surfaces exactly one of these.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Buy date {0} must be strictly before today")]
    BuyDateNotInPast(chrono::NaiveDate),

    #[error("Buy date {0} falls on a weekend (not a trading day)")]
    BuyDateOnWeekend(chrono::NaiveDate),

    #[error("Shares must be a positive whole number")]
    NonPositiveShares,

    #[error("Buy price must be positive")]
    NonPositivePrice,

    #[error("Buy price {buy_price} is outside the day's range [{day_low}, {day_high}]")]
    ImplausiblePrice {
        buy_price: f64,
        day_low: f64,
        day_high: f64,
    },

    #[error("Ticker {0} not found or non-trading day")]
    UnknownTicker(String),

    #[error("Close date {close_date} is before buy date {buy_date}")]
    CloseBeforeBuy {
        close_date: chrono::NaiveDate,
        buy_date: chrono::NaiveDate,
    },

    #[error("Close price must be positive")]
    NonPositiveClosePrice,
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Store(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Store(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs embedded in reqwest errors so
        // provider query strings never leak into user-facing messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
