//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use anyhow::{anyhow, bail};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::models::{PeriodKey, Tab};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// api.polygon.io 前收盘 / 日K线接口
    Polygon,
    /// Yahoo Finance chart 接口
    Yahoo,
    /// 不访问网络，全部使用模拟数据
    Offline,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 数据源类型
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,
    /// 接口根地址（为空则使用数据源默认地址）
    #[serde(default)]
    pub base_url: Option<String>,
    /// API Key
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 刷新流水线形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// 仅行情
    Quote,
    /// 行情 + 短期历史收盘价
    History,
    /// 行情 + 多周期对比
    Comparisons,
}

/// 刷新配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// 定时刷新间隔（秒）
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// 流水线形态
    #[serde(default = "default_pipeline")]
    pub pipeline: PipelineMode,
    /// 历史图表的天数
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    /// 多周期对比所需的历史天数（约两年）
    #[serde(default = "default_comparison_days")]
    pub comparison_days: u32,
    /// 参与对比的周期
    #[serde(default = "default_periods")]
    pub periods: Vec<PeriodKey>,
}

/// 显示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 最后更新时间使用的时区（IANA 名称）
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// 关注列表配置，未设置时使用内置列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistConfig {
    /// 标签页及品种
    #[serde(default)]
    pub tabs: Option<Vec<Tab>>,
    /// 模拟数据基准价
    #[serde(default)]
    pub base_prices: Option<HashMap<String, f64>>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 配置来源，日志系统初始化后由 report 输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// 从文件加载
    File(String),
    /// 使用默认值，附带各配置文件的加载错误
    Default(Vec<String>),
}

impl ConfigSource {
    pub fn report(&self) {
        match self {
            ConfigSource::File(path) => log::info!("从 {} 加载配置成功", path),
            ConfigSource::Default(errors) => {
                for e in errors {
                    log::warn!("{}", e);
                }
                log::info!("使用默认配置");
            }
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 刷新配置
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 显示配置
    #[serde(default)]
    pub display: DisplayConfig,
    /// 关注列表
    #[serde(default)]
    pub watchlist: WatchlistConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_provider_kind() -> ProviderKind { ProviderKind::Polygon }
fn default_api_key() -> String { "demo".to_string() }
fn default_timeout() -> u64 { 10 }
fn default_connect_timeout() -> u64 { 5 }
fn default_interval() -> u64 { 5 * 60 }
fn default_pipeline() -> PipelineMode { PipelineMode::Quote }
fn default_history_days() -> u32 { 14 }
fn default_comparison_days() -> u32 { 730 }
fn default_periods() -> Vec<PeriodKey> { PeriodKey::ALL.to_vec() }
fn default_timezone() -> String { "Asia/Tokyo".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            base_url: None,
            api_key: default_api_key(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            pipeline: default_pipeline(),
            history_days: default_history_days(),
            comparison_days: default_comparison_days(),
            periods: default_periods(),
        }
    }
}

/// 历史窗口天数上限（十年）
pub const MAX_WINDOW_DAYS: u32 = 3650;

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// 校验历史窗口天数
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, days) in [
            ("history_days", self.history_days),
            ("comparison_days", self.comparison_days),
        ] {
            if days == 0 || days > MAX_WINDOW_DAYS {
                bail!("refresh.{} 应在 1..={} 之间: {}", name, MAX_WINDOW_DAYS, days);
            }
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl DisplayConfig {
    /// 解析时区名称
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("无效的时区 {}: {}", self.timezone, e))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.refresh.validate()?;
        config.display.tz()?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志系统尚未初始化，加载结果通过 ConfigSource 返回
    pub fn load() -> (Self, ConfigSource) {
        Self::load_from(&["config.json", "config/config.json"])
    }

    pub fn load_from<P: AsRef<Path>>(config_paths: &[P]) -> (Self, ConfigSource) {
        let mut errors = Vec::new();

        for path in config_paths {
            let path = path.as_ref();
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        return (config, ConfigSource::File(path.display().to_string()));
                    }
                    Err(e) => {
                        errors.push(format!("加载配置文件 {} 失败: {}", path.display(), e));
                    }
                }
            }
        }

        (Self::default(), ConfigSource::Default(errors))
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
