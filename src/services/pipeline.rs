//! 单只股票的刷新流水线
//!
//! 按配置的形态依次执行：行情 →（历史 →（多周期对比））

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::config::{PipelineMode, RefreshConfig};
use crate::models::{PeriodKey, Sourced, StockRecord, SymbolEntry};

use super::comparison::compute_comparisons;
use super::history_fetcher::HistoryFetcher;
use super::mock::MockDataGenerator;
use super::provider::MarketDataProvider;
use super::quote_fetcher::QuoteFetcher;

pub struct StockPipeline {
    mode: PipelineMode,
    history_days: u32,
    comparison_days: u32,
    periods: Vec<PeriodKey>,
    quotes: QuoteFetcher,
    history: HistoryFetcher,
    mock: Arc<MockDataGenerator>,
}

impl StockPipeline {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        mock: Arc<MockDataGenerator>,
        config: &RefreshConfig,
    ) -> Self {
        Self {
            mode: config.pipeline,
            history_days: config.history_days,
            comparison_days: config.comparison_days,
            periods: config.periods.clone(),
            quotes: QuoteFetcher::new(provider.clone(), mock.clone()),
            history: HistoryFetcher::new(provider, mock.clone()),
            mock,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// 生成单只股票的完整记录
    ///
    /// 各步骤内部已降级为模拟数据；只有最终记录不满足基本约束时才返回 Err
    pub async fn build_record(&self, entry: &SymbolEntry) -> Result<StockRecord> {
        let quote = self.quotes.fetch_quote(entry).await;
        let price = quote.value.price;

        if !(price > 0.0 && price.is_finite() && quote.value.previous_close > 0.0) {
            return Err(anyhow!("{} 的行情价格无效: {}", entry.symbol, price));
        }

        let record = match self.mode {
            PipelineMode::Quote => StockRecord::quote_only(quote),
            PipelineMode::History => {
                let history = self
                    .history
                    .fetch_history(&entry.symbol, self.history_days, Some(price))
                    .await;
                StockRecord::with_history(quote, history)
            }
            PipelineMode::Comparisons => {
                // 历史获取失败时不生成模拟历史，直接模拟全部周期
                let comparisons = match self
                    .history
                    .fetch_live(&entry.symbol, self.comparison_days)
                    .await
                {
                    Ok(history) => {
                        let periods = compute_comparisons(&history, price, &self.periods);
                        let absent = periods.values().filter(|c| c.is_absent()).count();
                        if absent > 0 {
                            log::debug!(
                                "{} 只有 {} 条历史记录，{} 个周期无法对比",
                                entry.symbol,
                                history.len(),
                                absent
                            );
                        }
                        Sourced::live(periods)
                    }
                    Err(e) => {
                        log::warn!("获取 {} 的对比历史失败: {}，使用模拟对比", entry.symbol, e);
                        Sourced::synthetic(self.mock.generate_mock_comparisons(price, &self.periods))
                    }
                };
                StockRecord::with_comparisons(quote, comparisons)
            }
        };

        Ok(record)
    }
}
