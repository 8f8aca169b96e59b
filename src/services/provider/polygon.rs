//! api.polygon.io 数据源
//!
//! - 前收盘：/v2/aggs/ticker/{symbol}/prev
//! - 日K线：/v2/aggs/ticker/{symbol}/range/1/day/{start}/{end}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::models::RawQuote;

use super::common::{build_client, endpoint, get_json, parse_base_url, positive_field};
use super::{DailyBar, MarketDataProvider};

/// Polygon 默认接口地址
pub const POLYGON_BASE_URL: &str = "https://api.polygon.io";

pub struct PolygonProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl PolygonProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: parse_base_url(config.base_url.as_deref(), POLYGON_BASE_URL)?,
            api_key: config.api_key.clone(),
        })
    }

    fn prev_url(&self, symbol: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, &["v2", "aggs", "ticker", symbol, "prev"])?;
        url.query_pairs_mut()
            .append_pair("adjusted", "true")
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }

    fn range_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let mut url = endpoint(
            &self.base_url,
            &["v2", "aggs", "ticker", symbol, "range", "1", "day", &start, &end],
        )?;
        url.query_pairs_mut()
            .append_pair("adjusted", "true")
            .append_pair("sort", "asc")
            .append_pair("limit", "5000")
            .append_pair("apikey", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    fn name(&self) -> &'static str {
        "polygon"
    }

    async fn latest_quote(&self, symbol: &str) -> Result<RawQuote> {
        let json = get_json(&self.client, self.prev_url(symbol)?).await?;
        parse_prev_close(&json)
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let json = get_json(&self.client, self.range_url(symbol, start, end)?).await?;
        parse_range(&json)
    }
}

/// 解析前收盘数据
///
/// 格式: {"results":[{"c":..,"o":..,"h":..,"l":..,"v":..,"t":..}], ...}
/// 当前价取 c，前收盘取 o（同一根日K线的开盘价）
pub fn parse_prev_close(json: &Value) -> Result<RawQuote> {
    let bar = json["results"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| anyhow!("响应中没有行情数据"))?;

    let price = positive_field(bar, "c")?;
    let previous_close = positive_field(bar, "o")?;

    Ok(RawQuote {
        price,
        previous_close,
        high: bar["h"].as_f64().unwrap_or(price),
        low: bar["l"].as_f64().unwrap_or(price),
        volume: bar["v"].as_f64().map(|v| v.max(0.0) as u64).unwrap_or(0),
        currency: "USD".to_string(),
        market_cap: None,
    })
}

/// 解析日K线区间数据
///
/// 格式: {"results":[{"t":1700000000000,"c":..}, ...]}，results 为空时视为无数据
pub fn parse_range(json: &Value) -> Result<Vec<DailyBar>> {
    let results = json["results"]
        .as_array()
        .ok_or_else(|| anyhow!("响应中没有历史数据"))?;

    let bars = results
        .iter()
        .filter_map(|item| {
            let timestamp_ms = item["t"].as_i64()?;
            Some(DailyBar {
                timestamp_ms,
                close: item["c"].as_f64(),
            })
        })
        .collect();

    Ok(bars)
}
