use chrono::{Datelike, NaiveDate, Weekday};

use crate::errors::{CoreError, ValidationError};
use crate::models::position::{Position, PositionInput};
use crate::models::settings::Settings;
use crate::providers::registry::ProviderRegistry;

/// A form submission that passed every validation step, ready for upsert.
#[derive(Debug, Clone)]
pub struct ValidatedPosition {
    pub position: Position,

    /// True when the buy date was defaulted to the most recent weekday.
    /// Such positions carry the synthesized `shares@price` key, and the
    /// buy price was never checked against a day's trading range.
    pub used_fallback_date: bool,
}

/// Validates proposed positions against the business rules before they
/// reach the store.
///
/// Checks run in a fixed order and short-circuit at the first failure, so
/// each submission surfaces exactly one rejection reason. The trading-range
/// and ticker-existence steps consult the price providers; everything else
/// is pure.
pub struct PositionValidator;

impl PositionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run the full validation pipeline on raw form input.
    ///
    /// Order: required fields → ticker normalization → missing-date
    /// fallback → date sanity → quantity sanity → price plausibility →
    /// ticker existence. When the buy date is defaulted it lands on the
    /// most recent weekday before today; only the plausibility step is
    /// skipped, since there is no user-asserted trade day to check a
    /// range against.
    pub async fn validate(
        &self,
        input: &PositionInput,
        settings: &Settings,
        providers: &ProviderRegistry,
        today: NaiveDate,
    ) -> Result<ValidatedPosition, CoreError> {
        // 1. Required fields (buy_date may be omitted)
        let raw_ticker = input.ticker.trim();
        if raw_ticker.is_empty() {
            return Err(ValidationError::MissingField("ticker").into());
        }
        let shares = input
            .shares
            .ok_or(ValidationError::MissingField("shares"))?;
        let buy_price = input
            .buy_price
            .ok_or(ValidationError::MissingField("buy_price"))?;

        // 2. Ticker normalization: uppercase, default exchange suffix
        let mut ticker = raw_ticker.to_uppercase();
        if !ticker.contains('.') {
            ticker.push('.');
            ticker.push_str(&settings.exchange_suffix.to_uppercase());
        }

        // 3. Missing-date fallback: the most recent weekday before today,
        // so the synthesized date satisfies the same rules as a typed one
        let (buy_date, used_fallback_date) = match input.buy_date {
            Some(date) => (date, false),
            None => (last_weekday_before(today), true),
        };

        // 4. Date sanity
        if buy_date >= today {
            return Err(ValidationError::BuyDateNotInPast(buy_date).into());
        }
        if matches!(buy_date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Err(ValidationError::BuyDateOnWeekend(buy_date).into());
        }

        // 5. Quantity sanity
        if shares == 0 {
            return Err(ValidationError::NonPositiveShares.into());
        }
        if !buy_price.is_finite() || buy_price <= 0.0 {
            return Err(ValidationError::NonPositivePrice.into());
        }

        // 6 + 7. Price plausibility and ticker existence. Both ride on one
        // fetch: an empty series is the "not found or non-trading day"
        // rejection; with data, the buy price must fall inside the day's
        // traded range.
        if used_fallback_date {
            // No asserted buy date to check a range against, so only confirm
            // the ticker resolves to some recent data.
            let from = today - chrono::Duration::days(7);
            let bars = providers.fetch_daily(&ticker, from, today).await?;
            if bars.is_empty() {
                return Err(ValidationError::UnknownTicker(ticker).into());
            }
        } else {
            let bars = providers.fetch_daily(&ticker, buy_date, buy_date).await?;
            let Some(day) = bars.iter().find(|b| b.date == buy_date) else {
                return Err(ValidationError::UnknownTicker(ticker).into());
            };
            if buy_price < day.low || buy_price > day.high {
                return Err(ValidationError::ImplausiblePrice {
                    buy_price,
                    day_low: day.low,
                    day_high: day.high,
                }
                .into());
            }
        }

        let position = if used_fallback_date {
            Position::with_synthesized_key(ticker, buy_date, buy_price, shares)
        } else {
            Position::new(ticker, buy_date, buy_price, shares)
        };

        Ok(ValidatedPosition {
            position,
            used_fallback_date,
        })
    }
}

impl Default for PositionValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Most recent weekday strictly before `today`.
fn last_weekday_before(today: NaiveDate) -> NaiveDate {
    let mut date = today - chrono::Duration::days(1);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date -= chrono::Duration::days(1);
    }
    date
}
