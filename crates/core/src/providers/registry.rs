use chrono::NaiveDate;

use super::stooq::StooqProvider;
use super::traits::PriceSeriesProvider;
use super::yahoo::YahooFinanceProvider;
use crate::errors::CoreError;
use crate::models::series::Bar;

/// Ordered collection of price-history providers with automatic fallback.
///
/// Providers are tried in registration order. A provider failure (network
/// down, rate limited) moves on to the next one; an `Ok` answer — including
/// an empty series, which is the defined "no data" result — is final.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn PriceSeriesProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default providers: Yahoo Finance
    /// primary, Stooq fallback.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        if let Ok(yahoo) = YahooFinanceProvider::new() {
            registry.register(Box::new(yahoo));
        }
        registry.register(Box::new(StooqProvider::new()));
        registry
    }

    /// Register a provider at the end of the fallback order.
    pub fn register(&mut self, provider: Box<dyn PriceSeriesProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Fetch daily bars for `[from, to]`, trying providers in order.
    pub async fn fetch_daily(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Bar>, CoreError> {
        if self.providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in &self.providers {
            match provider.fetch_daily(ticker, from, to).await {
                Ok(bars) => return Ok(bars),
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
