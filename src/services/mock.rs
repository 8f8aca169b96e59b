//! 模拟行情数据
//!
//! 真实行情获取失败时，以基准价为中心随机扰动生成行情、历史和多周期对比。
//! 随机源可注入（固定种子），便于复现。

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{
    ChartPoint, Comparison, Comparisons, History, HistoryPoint, PeriodKey, Quote, RawQuote,
};

use super::registry::SymbolRegistry;

/// 模拟历史的最低价格
pub const MIN_PRICE_FLOOR: f64 = 0.01;
/// 日内走势图的数据点数（24 小时）
pub const INTRADAY_POINTS: usize = 24;

/// 模拟行情：涨跌在基准价 ±5% 内，高低价各自在 2% 基准价内扰动
///
/// high = price + U·2%·base，low = price − U·2%·base，两者与真实交易区间无关
pub fn mock_raw_quote<R: Rng + ?Sized>(rng: &mut R, base_price: f64) -> RawQuote {
    let change = (rng.random::<f64>() - 0.5) * base_price * 0.1;
    let price = base_price + change;
    let high = price + rng.random::<f64>() * base_price * 0.02;
    let low = price - rng.random::<f64>() * base_price * 0.02;
    let volume = (rng.random::<f64>() * 10_000_000.0).floor() as u64 + 1_000_000;

    RawQuote {
        price,
        previous_close: base_price,
        high,
        low,
        volume,
        currency: "USD".to_string(),
        market_cap: None,
    }
}

/// 从 today 向前逐日随机游走，每步 ±1.5% 当前价，结果最新在前
pub fn mock_history<R: Rng + ?Sized>(
    rng: &mut R,
    current_price: f64,
    days: usize,
    today: NaiveDate,
) -> History {
    let step = current_price * 0.015;
    let mut price = current_price.max(MIN_PRICE_FLOOR);
    let mut history = Vec::with_capacity(days);

    for i in 0..days {
        if i > 0 {
            price = (price + (rng.random::<f64>() - 0.5) * 2.0 * step).max(MIN_PRICE_FLOOR);
        }
        history.push(HistoryPoint::new(today - Duration::days(i as i64), price));
    }

    history
}

/// 每个周期的参考价 = 当前价 / (1 + U(-0.1, 0.1))
pub fn mock_comparisons<R: Rng + ?Sized>(
    rng: &mut R,
    current_price: f64,
    periods: &[PeriodKey],
) -> Comparisons {
    periods
        .iter()
        .map(|&period| {
            let reference = current_price / (1.0 + rng.random_range(-0.1..0.1));
            (period, Comparison::against(period, reference, current_price))
        })
        .collect()
}

/// 日内走势：从前收盘价线性趋向当前价，叠加与涨跌幅相称的噪声，最低不低于前收盘的 80%
pub fn intraday_series<R: Rng + ?Sized>(rng: &mut R, quote: &Quote) -> Vec<ChartPoint> {
    let base = quote.previous_close;
    let volatility = quote.change.abs() / base;
    let floor = base * 0.8;

    (0..INTRADAY_POINTS)
        .map(|i| {
            let progress = i as f64 / (INTRADAY_POINTS - 1) as f64;
            let noise = (rng.random::<f64>() - 0.5) * volatility * 0.5;
            let price = base + (quote.price - base) * progress + noise * base;
            ChartPoint {
                label: format!("{}:00", i),
                price: price.max(floor),
            }
        })
        .collect()
}

/// 模拟数据生成器
///
/// 持有可注入种子的随机源；所有方法都不会失败
pub struct MockDataGenerator {
    registry: Arc<SymbolRegistry>,
    rng: Mutex<StdRng>,
}

impl MockDataGenerator {
    pub fn new(registry: Arc<SymbolRegistry>) -> Self {
        Self::with_rng(registry, StdRng::from_os_rng())
    }

    /// 固定种子，测试用
    pub fn seeded(registry: Arc<SymbolRegistry>, seed: u64) -> Self {
        Self::with_rng(registry, StdRng::seed_from_u64(seed))
    }

    fn with_rng(registry: Arc<SymbolRegistry>, rng: StdRng) -> Self {
        Self {
            registry,
            rng: Mutex::new(rng),
        }
    }

    fn with_rng_mut<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // 随机源被 panic 污染也继续使用，模拟数据必须可用
        let mut guard = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn generate_mock_quote(&self, symbol: &str) -> Quote {
        let base = self.registry.base_price(symbol);
        let raw = self.with_rng_mut(|rng| mock_raw_quote(rng, base));
        Quote::from_raw(symbol, &self.registry.display_name(symbol), raw)
    }

    /// current_price 为空时先生成一份模拟行情作为终点价
    pub fn generate_mock_history(
        &self,
        symbol: &str,
        current_price: Option<f64>,
        days: usize,
    ) -> History {
        let price = match current_price {
            Some(p) if p > 0.0 && p.is_finite() => p,
            _ => self.generate_mock_quote(symbol).price,
        };
        let today = Utc::now().date_naive();
        self.with_rng_mut(|rng| mock_history(rng, price, days, today))
    }

    pub fn generate_mock_comparisons(
        &self,
        current_price: f64,
        periods: &[PeriodKey],
    ) -> Comparisons {
        self.with_rng_mut(|rng| mock_comparisons(rng, current_price, periods))
    }

    pub fn generate_intraday_series(&self, quote: &Quote) -> Vec<ChartPoint> {
        self.with_rng_mut(|rng| intraday_series(rng, quote))
    }
}
