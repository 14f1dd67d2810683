use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use super::traits::PriceSeriesProvider;
use crate::errors::CoreError;
use crate::models::series::Bar;

const BASE_URL: &str = "https://stooq.com/q/d/l/";

/// Stooq provider for daily stock history.
///
/// - **Free**: No API key, no registration.
/// - **Format**: Plain CSV (`Date,Open,High,Low,Close,Volume`).
/// - **Strategy**: Registered after Yahoo as the fallback source.
///
/// Stooq answers unknown symbols with a "No data" body instead of an
/// HTTP error; that maps to the empty-Vec contract of the trait.
pub struct StooqProvider {
    client: Client,
}

impl StooqProvider {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSeriesProvider for StooqProvider {
    fn name(&self) -> &str {
        "Stooq"
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Bar>, CoreError> {
        let symbol = ticker.to_lowercase();
        let d1 = from.format("%Y%m%d").to_string();
        let d2 = to.format("%Y%m%d").to_string();

        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("s", symbol.as_str()),
                ("d1", d1.as_str()),
                ("d2", d2.as_str()),
                ("i", "d"),
            ])
            .send()
            .await?
            .text()
            .await?;

        if !body.starts_with("Date,") {
            // "No data" / "Exceeded the daily hits limit" bodies
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut bars = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CoreError::Api {
                provider: "Stooq".into(),
                message: format!("Malformed CSV row for {ticker}: {e}"),
            })?;
            let Some(bar) = parse_row(&record) else {
                continue;
            };
            if bar.date >= from && bar.date <= to {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Parse one `Date,Open,High,Low,Close[,Volume]` row. Rows with missing
/// or non-numeric fields (halted trading days) are skipped.
fn parse_row(record: &csv::StringRecord) -> Option<Bar> {
    let date = NaiveDate::parse_from_str(record.get(0)?, "%Y-%m-%d").ok()?;
    let open: f64 = record.get(1)?.parse().ok()?;
    let high: f64 = record.get(2)?.parse().ok()?;
    let low: f64 = record.get(3)?.parse().ok()?;
    let close: f64 = record.get(4)?.parse().ok()?;
    Some(Bar {
        date,
        open,
        high,
        low,
        close,
    })
}
