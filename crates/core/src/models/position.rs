use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the portfolio ledger.
///
/// Positions are keyed by `key` (the `dual_key` column in the persisted
/// table): ticker joined with either the buy date, or a `shares@price` tag
/// when no buy date was supplied at entry time. At most one position per
/// key exists in the store; inserting an existing key overwrites shares
/// and buy price in place instead of duplicating the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Market-suffix-qualified ticker, uppercased (e.g., "D05.SI")
    pub ticker: String,

    /// Purchase date (a weekday strictly before today)
    pub buy_date: NaiveDate,

    /// Price per share at purchase
    pub buy_price: f64,

    /// Share count (whole shares only)
    pub shares: u32,

    /// True once the position has been sold
    pub closed: bool,

    /// Present iff `closed`
    #[serde(default)]
    pub close_date: Option<NaiveDate>,

    /// Present iff `closed`
    #[serde(default)]
    pub close_price: Option<f64>,

    /// Unique join/upsert key ("dual_key" in the stored table)
    pub key: String,
}

impl Position {
    /// Create an open position keyed by ticker + buy date.
    pub fn new(ticker: impl Into<String>, buy_date: NaiveDate, buy_price: f64, shares: u32) -> Self {
        let ticker = ticker.into().to_uppercase();
        let key = Self::date_key(&ticker, buy_date);
        Self {
            ticker,
            buy_date,
            buy_price,
            shares,
            closed: false,
            close_date: None,
            close_price: None,
            key,
        }
    }

    /// Create an open position with a synthesized `shares@price` key,
    /// used when the buy date was defaulted rather than supplied.
    pub fn with_synthesized_key(
        ticker: impl Into<String>,
        buy_date: NaiveDate,
        buy_price: f64,
        shares: u32,
    ) -> Self {
        let ticker = ticker.into().to_uppercase();
        let key = Self::tag_key(&ticker, shares, buy_price);
        Self {
            ticker,
            buy_date,
            buy_price,
            shares,
            closed: false,
            close_date: None,
            close_price: None,
            key,
        }
    }

    /// Normal key form: `TICKER_YYYY-MM-DD`.
    pub fn date_key(ticker: &str, buy_date: NaiveDate) -> String {
        format!("{ticker}_{buy_date}")
    }

    /// Fallback key form: `TICKER_shares@price`.
    pub fn tag_key(ticker: &str, shares: u32, buy_price: f64) -> String {
        format!("{ticker}_{shares}@{buy_price}")
    }

    /// Capital committed to this position.
    pub fn invested(&self) -> f64 {
        self.buy_price * f64::from(self.shares)
    }

    /// Feed the position's identity fields into a hasher.
    /// Used for the ledger fingerprint that scopes the series cache.
    pub fn hash_identity<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;
        self.key.hash(state);
        self.ticker.hash(state);
        self.buy_date.hash(state);
        self.buy_price.to_bits().hash(state);
        self.shares.hash(state);
        self.closed.hash(state);
        self.close_date.hash(state);
        self.close_price.map(f64::to_bits).hash(state);
    }
}

/// Raw form input for a new position, before validation.
/// `buy_date` may be omitted — the validator substitutes the most recent
/// weekday and switches to the synthesized key form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionInput {
    pub ticker: String,
    pub buy_date: Option<NaiveDate>,
    pub shares: Option<u32>,
    pub buy_price: Option<f64>,
}

/// Result of committing a validated position to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// A new row was appended.
    Inserted,
    /// The key already existed; shares and buy price were overwritten.
    /// Carries the previous values so callers can surface a warning.
    Replaced {
        previous_shares: u32,
        previous_price: f64,
    },
}
