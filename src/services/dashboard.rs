//! 行情看板（刷新编排）
//!
//! 持有品种注册表、单股流水线和当前快照。每轮刷新：
//! 1. 展开所有标签页的品种；
//! 2. 每个品种一个 future，并发执行，全部结束后再合并；
//! 3. 合并结果写入新的快照，整体替换旧快照。
//!
//! 同一时间只允许一轮刷新，刷新进行中再次触发直接跳过。

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use chrono::Utc;
use chrono_tz::Tz;
use futures::future::join_all;
use futures::FutureExt;

use crate::models::{
    ChartPoint, CycleState, Direction, RecordDetail, RefreshOutcome, RefreshStatus, Snapshot,
    StockCard, StockRecord, TabView,
};

use super::mock::MockDataGenerator;
use super::pipeline::StockPipeline;
use super::registry::SymbolRegistry;

pub struct Dashboard {
    registry: Arc<SymbolRegistry>,
    pipeline: StockPipeline,
    mock: Arc<MockDataGenerator>,
    timezone: Tz,
    snapshot: RwLock<Arc<Snapshot>>,
    status: RwLock<RefreshStatus>,
    cycle: tokio::sync::Mutex<()>,
}

impl Dashboard {
    pub fn new(
        registry: Arc<SymbolRegistry>,
        pipeline: StockPipeline,
        mock: Arc<MockDataGenerator>,
        timezone: Tz,
    ) -> Self {
        Self {
            registry,
            pipeline,
            mock,
            timezone,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            status: RwLock::new(RefreshStatus::default()),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// 当前快照（整体值，读取期间不会被部分修改）
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn status(&self) -> RefreshStatus {
        let mut status = self
            .status
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|e| e.into_inner().clone());
        status.records = self.snapshot().len();
        status
    }

    fn update_status(&self, f: impl FnOnce(&mut RefreshStatus)) {
        let mut guard = self.status.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }

    fn replace_snapshot(&self, snapshot: Snapshot) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// 执行一轮刷新
    ///
    /// 单个品种失败只会让该品种缺席新快照；只有整轮无法产出任何记录时才返回 Err，
    /// 此时保留旧快照并记录错误
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let _cycle = match self.cycle.try_lock() {
            Ok(lock) => CycleGuard {
                dashboard: self,
                _lock: lock,
            },
            Err(_) => {
                log::info!("上一轮刷新尚未结束，跳过本次触发");
                return Ok(RefreshOutcome::Skipped);
            }
        };

        let result = self.run_cycle().await;

        match &result {
            Ok(outcome) => {
                let now = Utc::now();
                let local = now
                    .with_timezone(&self.timezone)
                    .format("%Y/%m/%d %H:%M:%S")
                    .to_string();
                self.update_status(|s| {
                    s.state = CycleState::Idle;
                    s.last_updated = Some(now);
                    s.last_updated_local = Some(local);
                    s.last_error = None;
                    s.last_outcome = Some(*outcome);
                });
            }
            Err(e) => {
                log::error!("行情刷新失败: {}", e);
                self.update_status(|s| {
                    s.state = CycleState::Idle;
                    s.last_error = Some(e.to_string());
                });
            }
        }

        result
    }

    async fn run_cycle(&self) -> Result<RefreshOutcome> {
        let universe = self.registry.universe();
        if universe.is_empty() {
            return Err(anyhow!("关注列表为空"));
        }

        self.update_status(|s| s.state = CycleState::Fetching);
        log::info!(
            "开始刷新 {} 个品种 (流水线: {:?})",
            universe.len(),
            self.pipeline.mode()
        );

        let tasks = universe.iter().map(|entry| {
            AssertUnwindSafe(self.pipeline.build_record(entry)).catch_unwind()
        });
        let results = join_all(tasks).await;

        self.update_status(|s| s.state = CycleState::Merging);

        let mut records: BTreeMap<String, StockRecord> = BTreeMap::new();
        let mut failed = 0;
        for (entry, result) in universe.iter().zip(results) {
            match result {
                Ok(Ok(record)) => {
                    records.insert(entry.symbol.clone(), record);
                }
                Ok(Err(e)) => {
                    failed += 1;
                    log::error!("生成 {} 的记录失败: {}", entry.symbol, e);
                }
                Err(_) => {
                    failed += 1;
                    log::error!("生成 {} 的记录时发生 panic", entry.symbol);
                }
            }
        }

        if records.is_empty() {
            return Err(anyhow!("{} 个品种全部刷新失败", universe.len()));
        }

        let live = records.values().filter(|r| r.is_live()).count();
        let outcome = RefreshOutcome::Completed {
            total: universe.len(),
            live,
            synthetic: records.len() - live,
            failed,
        };

        self.replace_snapshot(Snapshot {
            records,
            refreshed_at: Some(Utc::now()),
        });
        log::info!("刷新完成: {:?}", outcome);

        Ok(outcome)
    }

    /// 标签页视图，按显示顺序列出卡片；未获取到数据的卡片 record 为空
    pub fn tab_view(&self, key: &str) -> Option<TabView> {
        let tab = self.registry.tab(key)?;
        let snapshot = self.snapshot();

        let cards = tab
            .entries
            .iter()
            .map(|entry| {
                let record = snapshot.get(&entry.symbol).cloned();
                let direction = record
                    .as_ref()
                    .map(|r| r.quote.direction())
                    .unwrap_or(Direction::Neutral);
                StockCard {
                    entry: entry.clone(),
                    direction,
                    record,
                }
            })
            .collect();

        Some(TabView {
            key: tab.key.clone(),
            title: tab.title.clone(),
            cards,
        })
    }

    /// 价格走势图数据（时间正序）
    ///
    /// 有历史数据时使用历史收盘价，仅行情时生成日内走势
    pub fn chart_series(&self, symbol: &str) -> Option<Vec<ChartPoint>> {
        let snapshot = self.snapshot();
        let record = snapshot.get(symbol)?;

        let series = match &record.detail {
            RecordDetail::History { points, .. } => points
                .iter()
                .rev()
                .map(|p| ChartPoint {
                    label: p.label.clone(),
                    price: p.close,
                })
                .collect(),
            RecordDetail::Quote | RecordDetail::Comparisons { .. } => {
                self.mock.generate_intraday_series(&record.quote)
            }
        };

        Some(series)
    }
}

/// 持有刷新锁；刷新 future 中途被丢弃时把状态恢复为 Idle
struct CycleGuard<'a> {
    dashboard: &'a Dashboard,
    _lock: tokio::sync::MutexGuard<'a, ()>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.dashboard.update_status(|s| s.state = CycleState::Idle);
    }
}
