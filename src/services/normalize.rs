// src/services/normalize.rs
use log::warn;

use crate::error::{DashboardError, Result};
use crate::models::{Column, NormalizedPanel, Panel};

/// Rescale every column so its baseline reads 100.
///
/// The baseline is the value at the panel's earliest date, or the column's
/// first present value when that cell is missing. Columns with no value at
/// all, or whose baseline is zero or not finite, come back fully missing and
/// are listed in `nulled`.
pub fn normalize(panel: &Panel) -> NormalizedPanel {
    let mut nulled = Vec::new();
    let columns = panel
        .columns
        .iter()
        .map(|column| match baseline(column) {
            Ok(base) => Column {
                key: column.key.clone(),
                values: column.values.iter().map(|v| v.map(|x| x / base * 100.0)).collect(),
            },
            Err(e) => {
                warn!("Nulling column during normalization: {}", e);
                nulled.push(column.key.clone());
                Column {
                    key: column.key.clone(),
                    values: vec![None; column.values.len()],
                }
            }
        })
        .collect();

    NormalizedPanel {
        panel: Panel {
            dates: panel.dates.clone(),
            columns,
        },
        nulled,
    }
}

fn baseline(column: &Column) -> Result<f64> {
    // values[0] is the cell at the panel's minimum date
    let base = column
        .values
        .iter()
        .flatten()
        .copied()
        .next()
        .ok_or_else(|| DashboardError::EmptyColumn {
            key: column.key.clone(),
        })?;
    if base == 0.0 || !base.is_finite() {
        return Err(DashboardError::UnusableBaseline {
            key: column.key.clone(),
            value: base,
        });
    }
    Ok(base)
}
