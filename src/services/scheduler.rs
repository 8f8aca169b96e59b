//! 定时刷新
//!
//! 启动后立即刷新一次，之后按固定间隔刷新；stop() 通知任务退出并等待结束

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::dashboard::Dashboard;

pub struct RefreshScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn start(dashboard: Arc<Dashboard>, interval: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log::info!("定时刷新已启动，间隔 {:?}", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // 错误已记录在看板状态中
                        let _ = dashboard.refresh().await;
                    }
                    _ = stopped.changed() => break,
                }
            }

            log::info!("定时刷新已停止");
        });

        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            log::error!("定时刷新任务异常退出: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefreshConfig;
    use crate::services::mock::MockDataGenerator;
    use crate::services::pipeline::StockPipeline;
    use crate::services::provider::testing::ScriptedProvider;
    use crate::services::registry::SymbolRegistry;
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_refreshes_until_stopped() {
        let registry = Arc::new(SymbolRegistry::default());
        let mock = Arc::new(MockDataGenerator::seeded(registry.clone(), 3));
        let provider = Arc::new(ScriptedProvider::new().with_quote("SPY", 451.0, 450.0));
        let pipeline = StockPipeline::new(provider.clone(), mock.clone(), &RefreshConfig::default());
        let dashboard = Arc::new(Dashboard::new(registry, pipeline, mock, chrono_tz::Asia::Tokyo));

        let scheduler = RefreshScheduler::start(dashboard.clone(), Duration::from_secs(300));

        // 首次 tick 立即触发
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(dashboard.snapshot().len(), 10);
        assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 10);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 20);

        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 20);
    }
}
