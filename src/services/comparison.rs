//! 多周期对比计算
//!
//! 历史数据按最新在前排列，回看 k 条记录取 history[k] 作为参考价。
//! k 是记录条数而不是日历天数：节假日缺口不会被补齐，"5 条前" 即 "5 个交易日前"。

use crate::models::{Comparison, Comparisons, History, PeriodKey};

/// 计算各周期相对参考价的涨跌额与涨跌幅
///
/// 记录不足 k+1 条，或参考价为 0 / 非有限值时，该周期为空对比
pub fn compute_comparisons(history: &History, current_price: f64, periods: &[PeriodKey]) -> Comparisons {
    periods
        .iter()
        .map(|&period| (period, compare_at(history, current_price, period)))
        .collect()
}

/// 回看 offset 条记录处的参考收盘价，不存在或为 0 时返回 None
pub fn reference_close(history: &History, offset: usize) -> Option<f64> {
    history
        .get(offset)
        .map(|p| p.close)
        .filter(|close| *close != 0.0 && close.is_finite())
}

fn compare_at(history: &History, current_price: f64, period: PeriodKey) -> Comparison {
    match reference_close(history, period.lookback_offset()) {
        Some(base) => Comparison::against(period, base, current_price),
        None => Comparison::absent(period),
    }
}
