//! Yahoo Finance chart 数据源
//!
//! /v8/finance/chart/{symbol}?interval=1d&range=1d 取最新行情，
//! 同一接口带 period1/period2 取日收盘价

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::models::RawQuote;

use super::common::{build_client, endpoint, get_json, parse_base_url, positive_field};
use super::{DailyBar, MarketDataProvider};

/// Yahoo 默认接口地址
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooProvider {
    client: Client,
    base_url: Url,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base_url(config.base_url.as_deref(), YAHOO_BASE_URL)?,
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        endpoint(&self.base_url, &["v8", "finance", "chart", symbol])
    }

    fn quote_url(&self, symbol: &str) -> Result<Url> {
        let mut url = self.chart_url(symbol)?;
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }

    fn history_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        let period1 = unix_seconds(start);
        // period2 为开区间，取 end 的次日零点
        let period2 = unix_seconds(end + Duration::days(1));
        let mut url = self.chart_url(symbol)?;
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string());
        Ok(url)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn latest_quote(&self, symbol: &str) -> Result<RawQuote> {
        let json = get_json(&self.client, self.quote_url(symbol)?).await?;
        parse_chart_quote(&json)
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let json = get_json(&self.client, self.history_url(symbol, start, end)?).await?;
        parse_chart_history(&json)
    }
}

fn chart_result(json: &Value) -> Result<&Value> {
    if let Some(description) = json["chart"]["error"]["description"].as_str() {
        return Err(anyhow!("数据源返回错误: {}", description));
    }
    json["chart"]["result"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| anyhow!("响应中没有 chart.result"))
}

/// 解析 chart 接口的 meta 部分
///
/// 前收盘优先取 chartPreviousClose，缺失时取 previousClose
pub fn parse_chart_quote(json: &Value) -> Result<RawQuote> {
    let meta = &chart_result(json)?["meta"];

    let price = positive_field(meta, "regularMarketPrice")?;
    let previous_close = positive_field(meta, "chartPreviousClose")
        .or_else(|_| positive_field(meta, "previousClose"))?;

    Ok(RawQuote {
        price,
        previous_close,
        high: meta["regularMarketDayHigh"].as_f64().unwrap_or(price),
        low: meta["regularMarketDayLow"].as_f64().unwrap_or(price),
        volume: meta["regularMarketVolume"].as_u64().unwrap_or(0),
        currency: meta["currency"].as_str().unwrap_or("USD").to_string(),
        market_cap: meta["marketCap"].as_f64(),
    })
}

/// 解析 chart 接口的日收盘价
///
/// timestamp[] 与 indicators.quote[0].close[] 按下标对应，close 可能为 null
pub fn parse_chart_history(json: &Value) -> Result<Vec<DailyBar>> {
    let result = chart_result(json)?;
    let timestamps = result["timestamp"]
        .as_array()
        .ok_or_else(|| anyhow!("响应中没有 timestamp"))?;
    let closes = result["indicators"]["quote"][0]["close"]
        .as_array()
        .ok_or_else(|| anyhow!("响应中没有收盘价"))?;

    timestamps
        .iter()
        .zip(closes.iter())
        .map(|(ts, close)| -> Result<DailyBar> {
            let timestamp_ms = ts
                .as_i64()
                .and_then(|secs| secs.checked_mul(1000))
                .ok_or_else(|| anyhow!("时间戳无效: {}", ts))?;
            Ok(DailyBar {
                timestamp_ms,
                close: close.as_f64(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> YahooProvider {
        let config = ProviderConfig {
            kind: crate::config::ProviderKind::Yahoo,
            ..ProviderConfig::default()
        };
        YahooProvider::new(&config).unwrap()
    }

    #[test]
    fn test_quote_url() {
        let url = provider().quote_url("AAPL").unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?interval=1d&range=1d"
        );
    }

    #[test]
    fn test_history_url_period() {
        let start = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(1970, 1, 3).unwrap();
        let url = provider().history_url("QQQ", start, end).unwrap();
        assert!(url.as_str().contains("period1=86400"));
        assert!(url.as_str().contains("period2=259200"));
    }

    #[test]
    fn test_parse_chart_quote() {
        println!("\n========== 测试解析 Yahoo 行情 ==========");
        let data = json!({
            "chart": {
                "result": [{
                    "meta": {
                        "currency": "USD",
                        "symbol": "^GSPC",
                        "regularMarketPrice": 5010.5,
                        "chartPreviousClose": 5000.0,
                        "regularMarketDayHigh": 5020.0,
                        "regularMarketDayLow": 4990.0,
                        "regularMarketVolume": 2_100_000_000_u64
                    }
                }],
                "error": null
            }
        });

        let raw = parse_chart_quote(&data).unwrap();
        println!("  当前价: {} 前收盘: {}", raw.price, raw.previous_close);
        assert_eq!(raw.price, 5010.5);
        assert_eq!(raw.previous_close, 5000.0);
        assert_eq!(raw.volume, 2_100_000_000);
        assert_eq!(raw.market_cap, None);
    }

    #[test]
    fn test_parse_chart_quote_previous_close_fallback() {
        let data = json!({
            "chart": { "result": [{ "meta": { "regularMarketPrice": 10.0, "previousClose": 9.5 } }] }
        });
        let raw = parse_chart_quote(&data).unwrap();
        assert_eq!(raw.previous_close, 9.5);
        assert_eq!(raw.currency, "USD");
    }

    #[test]
    fn test_parse_chart_error() {
        let data = json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" } }
        });
        let err = parse_chart_quote(&data).unwrap_err();
        assert!(err.to_string().contains("delisted"));
        assert!(parse_chart_history(&data).is_err());
    }

    #[test]
    fn test_parse_chart_history_keeps_nulls() {
        let data = json!({
            "chart": {
                "result": [{
                    "timestamp": [100, 200, 300],
                    "indicators": { "quote": [{ "close": [10.0, null, 12.0] }] }
                }]
            }
        });
        let bars = parse_chart_history(&data).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0], DailyBar { timestamp_ms: 100_000, close: Some(10.0) });
        assert_eq!(bars[1].close, None);
    }

    #[test]
    fn test_parse_chart_history_rejects_bad_timestamp() {
        let data = json!({
            "chart": {
                "result": [{
                    "timestamp": [100, 10_000_000_000_000_000_i64],
                    "indicators": { "quote": [{ "close": [10.0, 11.0] }] }
                }]
            }
        });
        let err = parse_chart_history(&data).unwrap_err();
        assert!(err.to_string().contains("时间戳无效"));

        let data = json!({
            "chart": {
                "result": [{
                    "timestamp": ["100"],
                    "indicators": { "quote": [{ "close": [10.0] }] }
                }]
            }
        });
        assert!(parse_chart_history(&data).is_err());
    }
}
