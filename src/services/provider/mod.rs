//! 行情数据源
//!
//! 不同数据源的接口差异封装在各自模块内，对外统一为 `MarketDataProvider`：
//! - polygon：api.polygon.io 前收盘 / 日K线
//! - yahoo：Yahoo Finance chart 接口
//! - offline：不访问网络，总是失败（全部走模拟数据）

mod common;
mod offline;
mod polygon;
mod yahoo;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::{ProviderConfig, ProviderKind};
use crate::models::RawQuote;

pub use offline::OfflineProvider;
pub use polygon::PolygonProvider;
pub use yahoo::YahooProvider;

/// 日K线中的单条收盘价
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    /// 时间戳（毫秒）
    pub timestamp_ms: i64,
    /// 收盘价（数据源可能返回空值）
    pub close: Option<f64>,
}

/// 行情数据源
///
/// 任何传输错误、非 2xx 状态或数据格式异常都以 Err 返回，由调用方决定降级
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 数据源名称，用于日志
    fn name(&self) -> &'static str;

    /// 最新行情
    async fn latest_quote(&self, symbol: &str) -> Result<RawQuote>;

    /// [start, end] 区间的日收盘价，顺序不保证
    async fn daily_closes(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<DailyBar>>;
}

/// 按配置创建数据源
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match config.kind {
        ProviderKind::Polygon => Arc::new(PolygonProvider::new(config)?),
        ProviderKind::Yahoo => Arc::new(YahooProvider::new(config)?),
        ProviderKind::Offline => Arc::new(OfflineProvider),
    };
    log::info!("使用行情数据源: {}", provider.name());
    Ok(provider)
}
