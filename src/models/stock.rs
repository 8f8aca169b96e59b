//! 股票数据模型
//!
//! 定义行情、历史收盘价、多周期对比以及快照中每只股票的记录结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 品种分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stock,
    Etf,
    Index,
}

/// 关注列表中的单个品种
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// 股票代码（可能带有 ^ 等指数前缀）
    pub symbol: String,
    /// 显示名称
    pub name: String,
    /// 品种分类
    pub category: Category,
}

impl SymbolEntry {
    pub fn new(symbol: &str, name: &str, category: Category) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category,
        }
    }
}

/// 标签页（保有 / 关注 / 热门）
///
/// entries 的顺序即显示顺序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    /// 标签页标识，如 my-stocks
    pub key: String,
    /// 标签页标题
    pub title: String,
    /// 品种列表
    pub entries: Vec<SymbolEntry>,
}

/// 涨跌方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
    Neutral,
}

impl Direction {
    /// 按涨跌额的符号分类，恰好为 0 时为 neutral
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Positive
        } else if change < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// 数据来源：真实行情或模拟数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Synthetic,
}

/// 带来源标记的数据
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    pub fn live(value: T) -> Self {
        Self { value, source: DataSource::Live }
    }

    pub fn synthetic(value: T) -> Self {
        Self { value, source: DataSource::Synthetic }
    }

    pub fn is_live(&self) -> bool {
        self.source == DataSource::Live
    }
}

/// 数据源返回的原始行情（已映射为统一字段）
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub price: f64,
    pub previous_close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub currency: String,
    pub market_cap: Option<f64>,
}

/// 股票实时行情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 股票代码
    pub symbol: String,
    /// 显示名称
    pub name: String,
    /// 当前价格
    pub price: f64,
    /// 前收盘价
    pub previous_close: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 成交量
    pub volume: u64,
    /// 币种
    pub currency: String,
    /// 市值（可选）
    pub market_cap: Option<f64>,
}

impl Quote {
    /// 由原始行情构造，涨跌额和涨跌幅只在这里计算
    pub fn from_raw(symbol: &str, name: &str, raw: RawQuote) -> Self {
        let change = raw.price - raw.previous_close;
        let change_percent = change / raw.previous_close * 100.0;

        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: raw.price,
            previous_close: raw.previous_close,
            change,
            change_percent,
            high: raw.high,
            low: raw.low,
            volume: raw.volume,
            currency: raw.currency,
            market_cap: raw.market_cap,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_change(self.change)
    }
}

/// 历史收盘价数据点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// 交易日期
    pub date: NaiveDate,
    /// 显示用日期标签（MM/DD）
    pub label: String,
    /// 收盘价
    pub close: f64,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            label: date.format("%m/%d").to_string(),
            close,
        }
    }
}

/// 历史数据，统一按日期倒序（最新在前）
pub type History = Vec<HistoryPoint>;

/// 图表数据点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub price: f64,
}

/// 对比周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl PeriodKey {
    pub const ALL: [PeriodKey; 7] = [
        PeriodKey::OneDay,
        PeriodKey::OneWeek,
        PeriodKey::OneMonth,
        PeriodKey::ThreeMonths,
        PeriodKey::SixMonths,
        PeriodKey::OneYear,
        PeriodKey::TwoYears,
    ];

    /// 回看的记录条数（按交易日记录计，不是日历天数）
    pub fn lookback_offset(&self) -> usize {
        match self {
            Self::OneDay => 1,
            Self::OneWeek => 5,
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::SixMonths => 126,
            Self::OneYear => 252,
            Self::TwoYears => 504,
        }
    }
}

/// 多周期对比结果
///
/// 历史数据不足或参考价为 0 时，base_price / change / percent 全部为空，方向为 neutral
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub period: PeriodKey,
    pub lookback_offset: usize,
    pub base_price: Option<f64>,
    pub change: Option<f64>,
    pub percent: Option<f64>,
    pub direction: Direction,
}

impl Comparison {
    pub fn absent(period: PeriodKey) -> Self {
        Self {
            period,
            lookback_offset: period.lookback_offset(),
            base_price: None,
            change: None,
            percent: None,
            direction: Direction::Neutral,
        }
    }

    /// 以参考价计算对比，参考价无效时返回空对比
    pub fn against(period: PeriodKey, base_price: f64, current_price: f64) -> Self {
        if base_price == 0.0 || !base_price.is_finite() {
            return Self::absent(period);
        }
        let change = current_price - base_price;
        Self {
            period,
            lookback_offset: period.lookback_offset(),
            base_price: Some(base_price),
            change: Some(change),
            percent: Some(change / base_price * 100.0),
            direction: Direction::from_change(change),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.change.is_none()
    }
}

pub type Comparisons = BTreeMap<PeriodKey, Comparison>;

/// 记录形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum RecordDetail {
    /// 仅行情
    Quote,
    /// 行情 + 历史收盘价
    History { points: History, source: DataSource },
    /// 行情 + 多周期对比
    Comparisons { periods: Comparisons, source: DataSource },
}

/// 快照中每只股票的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub quote: Quote,
    pub quote_source: DataSource,
    pub detail: RecordDetail,
}

impl StockRecord {
    pub fn quote_only(quote: Sourced<Quote>) -> Self {
        Self {
            quote: quote.value,
            quote_source: quote.source,
            detail: RecordDetail::Quote,
        }
    }

    pub fn with_history(quote: Sourced<Quote>, history: Sourced<History>) -> Self {
        Self {
            quote: quote.value,
            quote_source: quote.source,
            detail: RecordDetail::History {
                points: history.value,
                source: history.source,
            },
        }
    }

    pub fn with_comparisons(quote: Sourced<Quote>, comparisons: Sourced<Comparisons>) -> Self {
        Self {
            quote: quote.value,
            quote_source: quote.source,
            detail: RecordDetail::Comparisons {
                periods: comparisons.value,
                source: comparisons.source,
            },
        }
    }

    /// 行情和附加数据是否都来自真实行情
    pub fn is_live(&self) -> bool {
        let detail_live = match &self.detail {
            RecordDetail::Quote => true,
            RecordDetail::History { source, .. } | RecordDetail::Comparisons { source, .. } => {
                *source == DataSource::Live
            }
        };
        self.quote_source == DataSource::Live && detail_live
    }
}
