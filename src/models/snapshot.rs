//! 快照模型
//!
//! 快照是 symbol → 记录的完整映射，每轮刷新结束后整体替换

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stock::{Direction, StockRecord, SymbolEntry};

/// 行情快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 股票记录，刷新失败的品种不在其中
    pub records: BTreeMap<String, StockRecord>,
    /// 生成时间
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&StockRecord> {
        self.records.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 刷新周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    Idle,
    Fetching,
    Merging,
}

/// 一轮刷新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// 本轮完成
    Completed {
        total: usize,
        live: usize,
        synthetic: usize,
        failed: usize,
    },
    /// 已有刷新在进行中，本次触发被跳过
    Skipped,
}

/// 刷新状态，供前端显示加载中 / 错误 / 最后更新时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub state: CycleState,
    pub last_updated: Option<DateTime<Utc>>,
    /// 本地时区的最后更新时间（如 2026/10/19 09:30:00）
    pub last_updated_local: Option<String>,
    pub last_error: Option<String>,
    pub last_outcome: Option<RefreshOutcome>,
    /// 当前快照中的品种数
    pub records: usize,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            state: CycleState::Idle,
            last_updated: None,
            last_updated_local: None,
            last_error: None,
            last_outcome: None,
            records: 0,
        }
    }
}

/// 标签页中的一张卡片
///
/// record 为空时前端显示“数据获取中”
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCard {
    pub entry: SymbolEntry,
    pub direction: Direction,
    pub record: Option<StockRecord>,
}

/// 标签页视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabView {
    pub key: String,
    pub title: String,
    pub cards: Vec<StockCard>,
}
