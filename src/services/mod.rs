//! 业务逻辑服务模块
//! 
//! 封装行情获取、降级、派生计算和快照刷新逻辑

pub mod comparison;       // 多周期对比
pub mod dashboard;        // 刷新编排与快照
pub mod history_fetcher;  // 历史收盘价获取
pub mod mock;             // 模拟行情数据
pub mod pipeline;         // 单股流水线
pub mod provider;         // 行情数据源
pub mod quote_fetcher;    // 行情获取
pub mod registry;         // 品种注册表
pub mod scheduler;        // 定时刷新

pub use dashboard::Dashboard;
pub use mock::MockDataGenerator;
pub use pipeline::StockPipeline;
pub use registry::SymbolRegistry;
pub use scheduler::RefreshScheduler;
