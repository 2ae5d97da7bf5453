// src/services/panel.rs
use futures::future::try_join_all;
use log::info;

use crate::error::{DashboardError, Result};
use crate::models::{Instrument, Panel};
use crate::services::fetcher::SeriesFetcher;

/// Fetch every instrument and outer-join the closes on date.
///
/// Fetches run concurrently; columns follow `instruments` order regardless of
/// completion order. The first failed fetch fails the whole panel.
pub async fn assemble(
    fetcher: &SeriesFetcher,
    instruments: &[&Instrument],
    days: u32,
) -> Result<Panel> {
    info!(
        "Assembling {}-day panel for {} instruments",
        days,
        instruments.len()
    );

    let fetches = instruments.iter().map(|inst| async move {
        let series = fetcher.fetch(inst.symbol, days).await?;
        Ok::<_, DashboardError>((inst.key.to_string(), series))
    });
    let series = try_join_all(fetches).await?;

    let panel = Panel::from_series(series);
    info!(
        "Panel ready: {} dates x {} columns",
        panel.dates.len(),
        panel.columns.len()
    );
    Ok(panel)
}
