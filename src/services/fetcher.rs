// src/services/fetcher.rs
use log::info;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::error::{DashboardError, Result};
use crate::models::PriceSeries;
use crate::services::cache::TtlCache;
use crate::services::provider::PriceProvider;

pub const CLOSE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

/// Memoized access to a `PriceProvider`, keyed by `(symbol, days)`.
pub struct SeriesFetcher {
    provider: Arc<dyn PriceProvider>,
    cache: TtlCache<(String, u32), PriceSeries>,
}

impl SeriesFetcher {
    pub fn new(provider: Arc<dyn PriceProvider>, ttl: Duration) -> Self {
        SeriesFetcher {
            provider,
            cache: TtlCache::new(ttl),
        }
    }

    pub async fn fetch(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        if days == 0 {
            return Err(DashboardError::InvalidRequest(
                "lookback window must be at least one day".to_string(),
            ));
        }
        let provider = &self.provider;
        self.cache
            .get_or_compute((symbol.to_string(), days), || async move {
                info!(
                    "Fetching {} ({} days) from {}",
                    symbol,
                    days,
                    provider.name()
                );
                provider.fetch_close(symbol, days).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::stub::StubProvider;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_fetch_hits_provider_once_per_ttl() {
        let stub = Arc::new(
            StubProvider::default().with_series("AAPL", &[(d(4), Some(1.0)), (d(5), None)]),
        );
        let fetcher = SeriesFetcher::new(stub.clone(), CLOSE_TTL);

        let first = fetcher.fetch("AAPL", 5).await.unwrap();
        let second = fetcher.fetch("AAPL", 5).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(stub.calls(), 1);

        fetcher.fetch("AAPL", 90).await.unwrap();
        assert_eq!(stub.calls(), 2);

        tokio::time::advance(CLOSE_TTL + Duration::from_secs(1)).await;
        fetcher.fetch("AAPL", 5).await.unwrap();
        assert_eq!(stub.calls(), 3);
    }

    #[tokio::test]
    async fn unknown_symbol_data_is_an_empty_series() {
        let stub = Arc::new(StubProvider::default());
        let fetcher = SeriesFetcher::new(stub, CLOSE_TTL);
        assert!(fetcher.fetch("ZZZ", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_are_retried_on_next_call() {
        let stub = Arc::new(StubProvider::default().failing("CL=F"));
        let fetcher = SeriesFetcher::new(stub.clone(), CLOSE_TTL);

        assert!(matches!(
            fetcher.fetch("CL=F", 5).await,
            Err(DashboardError::DataSource { .. })
        ));
        assert!(fetcher.fetch("CL=F", 5).await.is_err());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn zero_day_window_is_rejected_without_fetching() {
        let stub = Arc::new(StubProvider::default());
        let fetcher = SeriesFetcher::new(stub.clone(), CLOSE_TTL);
        assert!(fetcher.fetch("AAPL", 0).await.is_err());
        assert_eq!(stub.calls(), 0);
    }
}
