// src/services/yahoo.rs
//! Daily closes from Yahoo Finance's v8 chart endpoint.
//!
//! Only `indicators.quote[0].close` is consumed. Bar timestamps are mapped to
//! calendar dates in the exchange's own timezone so that futures bars stamped
//! at local midnight do not slide onto the previous UTC day.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use log::{debug, info};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{DashboardError, Result};
use crate::models::{PricePoint, PriceSeries};
use crate::services::provider::PriceProvider;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(YahooProvider {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, symbol: &str, days: u32) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| DashboardError::data_source(symbol, e))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::data_source(symbol, "provider URL cannot take a path"))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", &format!("{}d", days))
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch_close(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        let url = self.chart_url(symbol, days)?;
        info!("Fetching {}d of closes for {} from {}", days, symbol, url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::data_source(symbol, e))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DashboardError::data_source(symbol, e))?;

        match serde_json::from_str::<ChartResponse>(&body) {
            Ok(chart) if status.is_success() || chart.chart.error.is_some() => {
                let series = parse_chart(symbol, chart)?;
                debug!("{} returned {} observations", symbol, series.points.len());
                Ok(series)
            }
            Ok(_) => Err(DashboardError::data_source(symbol, format!("HTTP {}", status))),
            Err(e) if status.is_success() => Err(DashboardError::data_source(
                symbol,
                format!("undecodable response: {}", e),
            )),
            Err(_) => Err(DashboardError::data_source(symbol, format!("HTTP {}", status))),
        }
    }
}

fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<PriceSeries> {
    let data = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(DashboardError::data_source(
                symbol,
                format!("{}: {}", err.code, err.description),
            ))
        }
        (Some(results), None) => results
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::data_source(symbol, "result array is empty"))?,
        (None, None) => {
            return Err(DashboardError::data_source(
                symbol,
                "empty result with no error",
            ))
        }
    };

    let timestamps = match data.timestamp {
        Some(ts) if !ts.is_empty() => ts,
        _ => return Ok(PriceSeries::empty(symbol)),
    };

    let closes = data
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .map(|q| q.close)
        .ok_or_else(|| DashboardError::data_source(symbol, "no quote data"))?;

    let meta = data.meta.as_ref();
    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = trading_date(ts, meta).ok_or_else(|| {
            DashboardError::data_source(symbol, format!("invalid timestamp: {}", ts))
        })?;
        let close = closes.get(i).copied().flatten().filter(|c| c.is_finite());

        // Same-day repeats keep the last present close.
        by_date
            .entry(date)
            .and_modify(|slot| {
                if close.is_some() {
                    *slot = close;
                }
            })
            .or_insert(close);
    }

    Ok(PriceSeries {
        symbol: symbol.to_string(),
        points: by_date
            .into_iter()
            .map(|(date, close)| PricePoint { date, close })
            .collect(),
    })
}

fn trading_date(ts: i64, meta: Option<&ChartMeta>) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp(ts, 0)?;

    let named = meta
        .and_then(|m| m.exchange_timezone_name.as_deref())
        .and_then(|name| name.parse::<Tz>().ok());
    if let Some(tz) = named {
        return Some(utc.with_timezone(&tz).date_naive());
    }

    let fixed = meta
        .and_then(|m| m.gmtoffset)
        .and_then(FixedOffset::east_opt);
    if let Some(offset) = fixed {
        return Some(utc.with_timezone(&offset).date_naive());
    }

    Some(utc.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(symbol: &str, json: &str) -> Result<PriceSeries> {
        parse_chart(symbol, serde_json::from_str(json).unwrap())
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn closes_keep_missing_values() {
        // 2024-03-04 and 2024-03-05 14:30 UTC (09:30 New York)
        let series = parse(
            "AAPL",
            r#"{"chart":{"result":[{
                "meta":{"exchangeTimezoneName":"America/New_York","gmtoffset":-18000},
                "timestamp":[1709562600,1709649000],
                "indicators":{"quote":[{"open":[1,2],"close":[175.1,null]}]}
            }],"error":null}}"#,
        )
        .unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(
            series.points,
            vec![
                PricePoint {
                    date: d(2024, 3, 4),
                    close: Some(175.1),
                },
                PricePoint {
                    date: d(2024, 3, 5),
                    close: None,
                },
            ]
        );
    }

    #[test]
    fn futures_bars_use_exchange_local_date() {
        // 2024-03-05 05:00 UTC is midnight in New York, 03:00 UTC is still
        // the evening of 2024-03-04 there.
        let series = parse(
            "GC=F",
            r#"{"chart":{"result":[{
                "meta":{"exchangeTimezoneName":"America/New_York"},
                "timestamp":[1709614800,1709607600],
                "indicators":{"quote":[{"close":[2100.0,2101.0]}]}
            }],"error":null}}"#,
        )
        .unwrap();
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 5)]);
    }

    #[test]
    fn gmtoffset_is_the_fallback_timezone() {
        let series = parse(
            "X",
            r#"{"chart":{"result":[{
                "meta":{"exchangeTimezoneName":"Not/AZone","gmtoffset":-18000},
                "timestamp":[1709611200],
                "indicators":{"quote":[{"close":[1.0]}]}
            }],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(series.points[0].date, d(2024, 3, 4));
    }

    #[test]
    fn duplicate_dates_keep_last_present_close() {
        let series = parse(
            "MSFT",
            r#"{"chart":{"result":[{
                "meta":{"exchangeTimezoneName":"UTC"},
                "timestamp":[1709562600,1709564400,1709566200],
                "indicators":{"quote":[{"close":[10.0,11.0,null]}]}
            }],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].close, Some(11.0));
    }

    #[test]
    fn no_timestamps_is_an_empty_series() {
        let series = parse(
            "ZM=F",
            r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn provider_error_is_a_data_source_error() {
        let err = parse(
            "NOPE",
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap_err();
        match err {
            DashboardError::DataSource { symbol, reason } => {
                assert_eq!(symbol, "NOPE");
                assert!(reason.starts_with("Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn chart_url_encodes_symbol_and_range() {
        let provider =
            YahooProvider::new("https://query2.finance.yahoo.com", Duration::from_secs(5)).unwrap();
        let url = provider.chart_url("GC=F", 180).unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/GC=F");
        assert_eq!(url.query(), Some("range=180d&interval=1d"));
    }
}
