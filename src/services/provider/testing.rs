//! 测试用的脚本化数据源

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::models::RawQuote;

use super::{DailyBar, MarketDataProvider};

/// 按预设数据应答的数据源
///
/// - failing 中的代码模拟传输失败
/// - panicking 中的代码在请求时 panic
/// - 设置 gate 后所有请求等待放行
/// - panic_everywhere(true) 后所有请求都 panic
#[derive(Default)]
pub struct ScriptedProvider {
    quotes: HashMap<String, RawQuote>,
    histories: HashMap<String, Vec<DailyBar>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    gate: Option<watch::Receiver<bool>>,
    panic_all: AtomicBool,
    pub quote_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, price: f64, previous_close: f64) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            RawQuote {
                price,
                previous_close,
                high: price.max(previous_close),
                low: price.min(previous_close),
                volume: 1_000,
                currency: "USD".to_string(),
                market_cap: None,
            },
        );
        self
    }

    pub fn with_history(mut self, symbol: &str, bars: &[(i64, f64)]) -> Self {
        let bars = bars
            .iter()
            .map(|&(timestamp_ms, close)| DailyBar {
                timestamp_ms,
                close: Some(close),
            })
            .collect();
        self.histories.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_panicking(mut self, symbol: &str) -> Self {
        self.panicking.insert(symbol.to_string());
        self
    }

    pub fn with_gate(mut self, gate: watch::Receiver<bool>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn panic_everywhere(&self, on: bool) {
        self.panic_all.store(on, Ordering::SeqCst);
    }

    async fn pass_gate(&self, symbol: &str) -> Result<()> {
        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            gate.wait_for(|open| *open).await?;
        }
        if self.panic_all.load(Ordering::SeqCst) || self.panicking.contains(symbol) {
            panic!("scripted panic for {}", symbol);
        }
        if self.failing.contains(symbol) {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn latest_quote(&self, symbol: &str) -> Result<RawQuote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(symbol).await?;
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("响应中没有行情数据"))
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        self.pass_gate(symbol).await?;
        Ok(self.histories.get(symbol).cloned().unwrap_or_default())
    }
}
