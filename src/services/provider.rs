// src/services/provider.rs
use async_trait::async_trait;

use crate::error::Result;
use crate::models::PriceSeries;

/// Upstream source of daily closing prices.
///
/// `days` is a trailing calendar-day lookback that the provider resolves to
/// trading days. A valid symbol with nothing in the window is an empty
/// series, not an error.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_close(&self, symbol: &str, days: u32) -> Result<PriceSeries>;
}
