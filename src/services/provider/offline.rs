//! 离线数据源：不访问网络，所有请求都失败，由上层降级为模拟数据

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::RawQuote;

use super::{DailyBar, MarketDataProvider};

pub struct OfflineProvider;

#[async_trait]
impl MarketDataProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn latest_quote(&self, symbol: &str) -> Result<RawQuote> {
        Err(anyhow!("离线模式，不获取 {} 的行情", symbol))
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        Err(anyhow!("离线模式，不获取 {} 的历史数据", symbol))
    }
}
