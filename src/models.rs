// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which catalog the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Equity,
    Commodity,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Equity => "equity",
            ViewMode::Commodity => "commodity",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equity" => Ok(ViewMode::Equity),
            "commodity" => Ok(ViewMode::Commodity),
            other => Err(DashboardError::InvalidRequest(format!(
                "unknown view mode '{}'",
                other
            ))),
        }
    }
}

// Path and query parameters share the case-insensitive `FromStr` parse.
impl<'de> Deserialize<'de> for ViewMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub key: &'static str,
    pub symbol: &'static str,
    pub label: &'static str,
}

/// Per-mode configuration the UI starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeDefaults {
    pub days_min: u32,
    pub days_max: u32,
    pub days_default: u32,
    pub relative_default: bool,
}

impl ModeDefaults {
    pub fn contains(&self, days: u32) -> bool {
        days >= self.days_min && days <= self.days_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Daily closes for one symbol, ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn empty(symbol: impl Into<String>) -> Self {
        PriceSeries {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Wide date x instrument table. Every column has exactly `dates.len()` cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Panel {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl Panel {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn table(&self) -> TableView {
        let rows = self
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| TableRow {
                date: date.format(DATE_FORMAT).to_string(),
                values: self.columns.iter().map(|c| c.values[i]).collect(),
            })
            .collect();
        TableView {
            columns: self.columns.iter().map(|c| c.key.clone()).collect(),
            rows,
        }
    }

    /// Outer join of independently fetched series, one column per key.
    pub fn from_series(series: Vec<(String, PriceSeries)>) -> Panel {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, s)| s.dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = series
            .into_iter()
            .map(|(key, s)| {
                let mut values = vec![None; dates.len()];
                for point in &s.points {
                    if let Ok(idx) = dates.binary_search(&point.date) {
                        values[idx] = point.close;
                    }
                }
                Column { key, values }
            })
            .collect();

        Panel { dates, columns }
    }
}

/// Output of the normalizer: the rescaled panel plus the columns that had no
/// baseline and were nulled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPanel {
    pub panel: Panel,
    pub nulled: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub date: NaiveDate,
    pub name: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(rename = "Date")]
    pub date: String,
    pub values: Vec<Option<f64>>,
}

/// Grid input for the front end: ISO dates ascending, keys as column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    /// `Date` first, then one column per key; missing cells are left empty.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(std::iter::once("Date").chain(self.columns.iter().map(String::as_str)))?;
        for row in &self.rows {
            let cells = std::iter::once(row.date.clone()).chain(
                row.values
                    .iter()
                    .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
            );
            wtr.write_record(cells)?;
        }
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AxisScale {
    Auto { zero: bool, nice: bool, padding: u32 },
    Manual { domain: [f64; 2] },
}

impl AxisScale {
    pub const RANGE_BOUNDS: (f64, f64) = (0.0, 1000.0);
    pub const DEFAULT_RANGE: (f64, f64) = (80.0, 620.0);

    pub fn auto() -> Self {
        AxisScale::Auto {
            zero: false,
            nice: false,
            padding: 40,
        }
    }

    pub fn manual(min: f64, max: f64) -> Result<Self, DashboardError> {
        let (lo, hi) = Self::RANGE_BOUNDS;
        if !(min >= lo && max <= hi && min < max) {
            return Err(DashboardError::InvalidRequest(format!(
                "y range ({}, {}) must satisfy {} <= min < max <= {}",
                min, max, lo, hi
            )));
        }
        Ok(AxisScale::Manual { domain: [min, max] })
    }
}

/// Rendering hints for the line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub rows: Vec<TidyRow>,
    pub y_title: &'static str,
    pub scale: AxisScale,
    pub x_title: &'static str,
    pub date_format: &'static str,
    pub legend_title: &'static str,
    pub price_label: &'static str,
    pub price_format: &'static str,
    pub interpolate: &'static str,
    pub height: u32,
}

/// What the front end needs to draw the controls for a view mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub mode: ViewMode,
    pub title: &'static str,
    pub defaults: ModeDefaults,
    pub default_selection: Vec<&'static str>,
    pub y_range_bounds: [f64; 2],
    pub default_y_range: [f64; 2],
    pub instruments: &'static [Instrument],
}

/// Everything one render cycle produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub mode: ViewMode,
    pub title: &'static str,
    pub heading: String,
    pub days: u32,
    pub relative: bool,
    pub chart: ChartView,
    pub table: TableView,
    pub nulled_columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn series(symbol: &str, points: &[(u32, Option<f64>)]) -> PriceSeries {
        PriceSeries {
            symbol: symbol.to_string(),
            points: points
                .iter()
                .map(|&(day, close)| PricePoint {
                    date: d(day),
                    close,
                })
                .collect(),
        }
    }

    #[test]
    fn outer_join_unions_dates_and_keeps_column_order() {
        let panel = Panel::from_series(vec![
            ("b".to_string(), series("B", &[(5, Some(2.0)), (7, Some(3.0))])),
            ("a".to_string(), series("A", &[(4, Some(1.0)), (5, None)])),
        ]);

        assert_eq!(panel.dates, vec![d(4), d(5), d(7)]);
        assert_eq!(panel.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(panel.columns[0].values, vec![None, Some(2.0), Some(3.0)]);
        assert_eq!(panel.columns[1].values, vec![Some(1.0), None, None]);
    }

    #[test]
    fn empty_series_yields_all_missing_column() {
        let panel = Panel::from_series(vec![
            ("a".to_string(), series("A", &[(4, Some(1.0))])),
            ("b".to_string(), PriceSeries::empty("B")),
        ]);
        assert_eq!(panel.column("b").unwrap().values, vec![None]);
    }

    #[test]
    fn table_formats_iso_dates() {
        let panel = Panel::from_series(vec![(
            "a".to_string(),
            series("A", &[(4, Some(1.5)), (11, None)]),
        )]);
        let table = panel.table();
        assert_eq!(table.columns, vec!["a"]);
        assert_eq!(table.rows[0].date, "2024-03-04");
        assert_eq!(table.rows[1].date, "2024-03-11");
        assert_eq!(table.rows[1].values, vec![None]);
    }

    #[test]
    fn csv_leaves_missing_cells_empty() {
        let panel = Panel::from_series(vec![
            ("gold".to_string(), series("GC=F", &[(4, Some(2050.5)), (5, None)])),
            ("silver".to_string(), series("SI=F", &[(5, Some(23.0))])),
        ]);
        let csv = String::from_utf8(panel.table().to_csv().unwrap()).unwrap();
        assert_eq!(
            csv,
            "Date,gold,silver\n2024-03-04,2050.5,\n2024-03-05,,23\n"
        );
    }

    #[test]
    fn manual_scale_rejects_inverted_or_out_of_bounds_ranges() {
        assert!(AxisScale::manual(80.0, 620.0).is_ok());
        assert!(AxisScale::manual(620.0, 80.0).is_err());
        assert!(AxisScale::manual(-1.0, 10.0).is_err());
        assert!(AxisScale::manual(0.0, 1000.5).is_err());
    }

    #[test]
    fn view_mode_parses_case_insensitively() {
        assert_eq!("Equity".parse::<ViewMode>().unwrap(), ViewMode::Equity);
        assert_eq!(" commodity ".parse::<ViewMode>().unwrap(), ViewMode::Commodity);
        assert!("bonds".parse::<ViewMode>().is_err());
    }

    #[test]
    fn view_mode_deserializes_like_it_parses() {
        let mode: ViewMode = serde_json::from_str("\"Equity\"").unwrap();
        assert_eq!(mode, ViewMode::Equity);
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"equity\"");
        assert!(serde_json::from_str::<ViewMode>("\"bonds\"").is_err());
    }
}
