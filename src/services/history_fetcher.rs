//! 历史收盘价获取
//!
//! 请求 [今天 - window_days, 今天] 的日收盘价，统一按时间倒序（最新在前）。
//! 数据源的排序不可信，这里总是重新排序；空数据或失败时降级为模拟历史。

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::models::{History, HistoryPoint, Sourced};

use super::mock::MockDataGenerator;
use super::provider::{DailyBar, MarketDataProvider};

pub struct HistoryFetcher {
    provider: Arc<dyn MarketDataProvider>,
    mock: Arc<MockDataGenerator>,
}

impl HistoryFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, mock: Arc<MockDataGenerator>) -> Self {
        Self { provider, mock }
    }

    /// 获取历史收盘价
    ///
    /// current_price 用于降级时让模拟历史落在已知的当前价附近
    pub async fn fetch_history(
        &self,
        symbol: &str,
        window_days: u32,
        current_price: Option<f64>,
    ) -> Sourced<History> {
        match self.fetch_live(symbol, window_days).await {
            Ok(history) => Sourced::live(history),
            Err(e) => {
                log::warn!(
                    "获取历史数据失败 ({}, {}): {}，使用模拟数据",
                    self.provider.name(),
                    symbol,
                    e
                );
                let days = window_days.max(1) as usize;
                Sourced::synthetic(self.mock.generate_mock_history(symbol, current_price, days))
            }
        }
    }

    /// 仅从数据源获取，不降级；结果为空视为失败
    pub async fn fetch_live(&self, symbol: &str, window_days: u32) -> Result<History> {
        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);

        let history = normalize_bars(self.provider.daily_closes(symbol, start, end).await?);
        if history.is_empty() {
            return Err(anyhow!("返回数据为空"));
        }
        Ok(history)
    }
}

/// 丢弃无收盘价的记录，按时间戳倒序排列
///
/// 收盘价为 0 的记录保留，按位置回看时由对比计算判定为缺失
pub fn normalize_bars(mut bars: Vec<DailyBar>) -> History {
    bars.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    bars.into_iter()
        .filter_map(|bar| {
            let close = bar.close.filter(|c| c.is_finite())?;
            let date = bar_date(bar.timestamp_ms)?;
            Some(HistoryPoint::new(date, close))
        })
        .collect()
}

fn bar_date(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn test_normalize_sorts_most_recent_first() {
        let bars = vec![
            DailyBar { timestamp_ms: DAY_MS, close: Some(100.0) },
            DailyBar { timestamp_ms: 3 * DAY_MS, close: Some(102.0) },
            DailyBar { timestamp_ms: 2 * DAY_MS, close: Some(101.0) },
        ];
        let history = normalize_bars(bars);
        let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![102.0, 101.0, 100.0]);
        assert_eq!(history[0].label, "01/04");
    }

    #[test]
    fn test_normalize_drops_missing_keeps_zero() {
        let bars = vec![
            DailyBar { timestamp_ms: DAY_MS, close: Some(0.0) },
            DailyBar { timestamp_ms: 2 * DAY_MS, close: None },
            DailyBar { timestamp_ms: 3 * DAY_MS, close: Some(f64::NAN) },
            DailyBar { timestamp_ms: 4 * DAY_MS, close: Some(5.0) },
        ];
        let history = normalize_bars(bars);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].close, 5.0);
        assert_eq!(history[1].close, 0.0);
    }

    #[tokio::test]
    async fn test_fetch_live_does_not_fall_back() {
        use crate::services::provider::testing::ScriptedProvider;
        use crate::services::registry::SymbolRegistry;

        let registry = Arc::new(SymbolRegistry::default());
        let mock = Arc::new(MockDataGenerator::seeded(registry, 5));
        let provider = ScriptedProvider::new()
            .with_history("SPY", &[(DAY_MS, 440.0)])
            .with_failing("QQQ");
        let fetcher = HistoryFetcher::new(Arc::new(provider), mock);

        assert_eq!(fetcher.fetch_live("SPY", 14).await.unwrap().len(), 1);
        assert!(fetcher.fetch_live("QQQ", 14).await.is_err());
        // 空数据同样视为失败
        assert!(fetcher.fetch_live("AAPL", 14).await.is_err());

        let fallback = fetcher.fetch_history("QQQ", 14, Some(401.0)).await;
        assert!(!fallback.is_live());
        assert_eq!(fallback.value.len(), 14);
        assert_eq!(fallback.value[0].close, 401.0);
    }
}
