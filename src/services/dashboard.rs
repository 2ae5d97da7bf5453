// src/services/dashboard.rs
use log::{error, info};

use crate::error::{DashboardError, Result};
use crate::models::{
    AxisScale, CatalogView, ChartView, DashboardView, Instrument, TableView, ViewMode, DATE_FORMAT,
};
use crate::services::catalog;
use crate::services::fetcher::SeriesFetcher;
use crate::services::normalize::normalize;
use crate::services::panel::assemble;
use crate::services::tidy::{label_lookup, tidy};

const CHART_HEIGHT: u32 = 420;

/// User choices for one render cycle. `None` means "use the mode default".
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub mode: ViewMode,
    pub days: Option<u32>,
    pub relative: Option<bool>,
    pub auto_scale: bool,
    pub y_range: Option<(f64, f64)>,
    /// `None` selects the catalog's default subset; `Some(vec![])` is an error.
    pub instruments: Option<Vec<String>>,
}

impl DashboardRequest {
    pub fn new(mode: ViewMode) -> Self {
        DashboardRequest {
            mode,
            days: None,
            relative: None,
            auto_scale: true,
            y_range: None,
            instruments: None,
        }
    }
}

/// A request with defaults applied and every field validated.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    mode: ViewMode,
    days: u32,
    relative: bool,
    scale: AxisScale,
    instruments: Vec<&'static Instrument>,
}

fn resolve(req: &DashboardRequest) -> Result<Resolved> {
    let instruments = select_instruments(req.mode, req.instruments.as_deref())?;

    let defaults = catalog::defaults(req.mode);
    let days = req.days.unwrap_or(defaults.days_default);
    if !defaults.contains(days) {
        return Err(DashboardError::InvalidRequest(format!(
            "days must be between {} and {} for the {} view, got {}",
            defaults.days_min, defaults.days_max, req.mode, days
        )));
    }

    let scale = if req.auto_scale {
        AxisScale::auto()
    } else {
        let (min, max) = req.y_range.unwrap_or(AxisScale::DEFAULT_RANGE);
        AxisScale::manual(min, max)?
    };

    Ok(Resolved {
        mode: req.mode,
        days,
        relative: req.relative.unwrap_or(defaults.relative_default),
        scale,
        instruments,
    })
}

/// Map requested keys onto the catalog, in catalog order, without duplicates.
fn select_instruments(
    mode: ViewMode,
    keys: Option<&[String]>,
) -> Result<Vec<&'static Instrument>> {
    let keys = match keys {
        None => return Ok(catalog::default_selection(mode)),
        Some([]) => return Err(DashboardError::NoSelection),
        Some(keys) => keys,
    };

    if let Some(unknown) = keys.iter().find(|k| catalog::find(mode, k).is_none()) {
        return Err(DashboardError::InvalidRequest(format!(
            "'{}' is not in the {} catalog",
            unknown, mode
        )));
    }

    Ok(catalog::resolve(mode)
        .iter()
        .filter(|inst| keys.iter().any(|k| k == inst.key))
        .collect())
}

pub fn y_title(mode: ViewMode, relative: bool) -> &'static str {
    match (mode, relative) {
        (ViewMode::Equity, true) => "Relative stock price (start = 100)",
        (ViewMode::Equity, false) => "Stock price (USD)",
        (ViewMode::Commodity, true) => "Relative price (start = 100)",
        (ViewMode::Commodity, false) => "Price (units vary by instrument)",
    }
}

fn legend_title(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Equity => "Company",
        ViewMode::Commodity => "Instrument",
    }
}

fn price_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Equity => "Stock price",
        ViewMode::Commodity => "Price",
    }
}

pub fn catalog_view(mode: ViewMode) -> CatalogView {
    let (lo, hi) = AxisScale::RANGE_BOUNDS;
    let (min, max) = AxisScale::DEFAULT_RANGE;
    CatalogView {
        mode,
        title: catalog::title(mode),
        defaults: catalog::defaults(mode),
        default_selection: catalog::default_selection(mode)
            .iter()
            .map(|i| i.key)
            .collect(),
        y_range_bounds: [lo, hi],
        default_y_range: [min, max],
        instruments: catalog::resolve(mode),
    }
}

pub struct Dashboard {
    fetcher: SeriesFetcher,
}

impl Dashboard {
    pub fn new(fetcher: SeriesFetcher) -> Self {
        Dashboard { fetcher }
    }

    /// One render cycle: selection -> panel -> [normalize] -> tidy rows.
    ///
    /// The table always carries the raw closes, even in relative mode.
    pub async fn render(&self, req: &DashboardRequest) -> Result<DashboardView> {
        let r = resolve(req)?;
        info!(
            "Rendering {} view: {} days, relative={}, {} instruments",
            r.mode,
            r.days,
            r.relative,
            r.instruments.len()
        );

        let panel = assemble(&self.fetcher, &r.instruments, r.days)
            .await
            .map_err(|e| {
                error!("Render cycle failed: {}", e);
                e
            })?;
        let table = panel.table();

        let (chart_panel, nulled_columns) = if r.relative {
            let normalized = normalize(&panel);
            (normalized.panel, normalized.nulled)
        } else {
            (panel, Vec::new())
        };

        let labels = label_lookup(r.instruments.iter().copied());
        let rows = tidy(&chart_panel, &labels)?;

        let title = catalog::title(r.mode);
        Ok(DashboardView {
            mode: r.mode,
            title,
            heading: format!("Past {} days of {}", r.days, title),
            days: r.days,
            relative: r.relative,
            chart: ChartView {
                rows,
                y_title: y_title(r.mode, r.relative),
                scale: r.scale,
                x_title: "Date",
                date_format: DATE_FORMAT,
                legend_title: legend_title(r.mode),
                price_label: price_label(r.mode),
                price_format: ".2f",
                interpolate: "monotone",
                height: CHART_HEIGHT,
            },
            table,
            nulled_columns,
        })
    }

    /// Raw closes for the selection, without building the chart.
    pub async fn table(&self, req: &DashboardRequest) -> Result<TableView> {
        let r = resolve(req)?;
        let panel = assemble(&self.fetcher, &r.instruments, r.days).await?;
        Ok(panel.table())
    }
}
