//! 行情获取
//!
//! 从数据源获取单只股票的最新行情；任何失败都降级为模拟行情，不向上抛错

use std::sync::Arc;

use crate::models::{Quote, Sourced, SymbolEntry};

use super::mock::MockDataGenerator;
use super::provider::MarketDataProvider;

pub struct QuoteFetcher {
    provider: Arc<dyn MarketDataProvider>,
    mock: Arc<MockDataGenerator>,
}

impl QuoteFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, mock: Arc<MockDataGenerator>) -> Self {
        Self { provider, mock }
    }

    /// 获取行情，失败时返回标记为 synthetic 的模拟行情
    pub async fn fetch_quote(&self, entry: &SymbolEntry) -> Sourced<Quote> {
        match self.provider.latest_quote(&entry.symbol).await {
            Ok(raw) => Sourced::live(Quote::from_raw(&entry.symbol, &entry.name, raw)),
            Err(e) => {
                log::warn!(
                    "获取行情失败 ({}, {}): {}，使用模拟数据",
                    self.provider.name(),
                    entry.symbol,
                    e
                );
                let mut quote = self.mock.generate_mock_quote(&entry.symbol);
                quote.name = entry.name.clone();
                Sourced::synthetic(quote)
            }
        }
    }
}
