// src/services/tidy.rs
use std::collections::HashMap;

use crate::error::{DashboardError, Result};
use crate::models::{Instrument, Panel, TidyRow};

/// Instrument key -> display label.
pub fn label_lookup<'a, I>(instruments: I) -> HashMap<&'static str, &'static str>
where
    I: IntoIterator<Item = &'a Instrument>,
{
    instruments.into_iter().map(|i| (i.key, i.label)).collect()
}

/// Unpivot a wide panel into `(date, label, price)` rows, column by column.
///
/// A key missing from `labels` means the lookup was built from a different
/// catalog than the panel, which is a bug in the caller.
pub fn tidy(panel: &Panel, labels: &HashMap<&str, &str>) -> Result<Vec<TidyRow>> {
    let mut rows = Vec::with_capacity(panel.dates.len() * panel.columns.len());
    for column in &panel.columns {
        let name = labels
            .get(column.key.as_str())
            .ok_or_else(|| DashboardError::UnknownInstrument(column.key.clone()))?;
        rows.extend(
            panel
                .dates
                .iter()
                .zip(&column.values)
                .map(|(date, price)| TidyRow {
                    date: *date,
                    name: name.to_string(),
                    price: *price,
                }),
        );
    }
    Ok(rows)
}
