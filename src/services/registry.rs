//! 品种注册表
//!
//! 标签页 → 品种列表，以及 symbol → 显示名称 / 模拟基准价 的静态映射

use std::collections::{HashMap, HashSet};

use crate::config::WatchlistConfig;
use crate::models::{Category, SymbolEntry, Tab};

/// 未登记品种的模拟基准价
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

/// 内置基准价表
const BASE_PRICES: &[(&str, f64)] = &[
    ("SPY", 450.0),
    ("NVDA", 800.0),
    ("META", 300.0),
    ("SOXL", 25.0),
    ("QQQ", 400.0),
    ("AAPL", 180.0),
    ("GOOGL", 140.0),
    ("AMZN", 150.0),
    ("NFLX", 400.0),
    ("TSLA", 250.0),
];

/// 内置标签页
fn default_tabs() -> Vec<Tab> {
    vec![
        Tab {
            key: "my-stocks".to_string(),
            title: "保有銘柄".to_string(),
            entries: vec![
                SymbolEntry::new("SPY", "SPDR S&P 500 ETF Trust", Category::Etf),
                SymbolEntry::new("NVDA", "NVIDIA Corporation", Category::Stock),
                SymbolEntry::new("META", "Meta Platforms Inc", Category::Stock),
            ],
        },
        Tab {
            key: "watchlist".to_string(),
            title: "ウォッチリスト".to_string(),
            entries: vec![
                SymbolEntry::new("SOXL", "Direxion Daily Semiconductor Bull 3X Shares", Category::Etf),
                SymbolEntry::new("QQQ", "Invesco QQQ Trust", Category::Etf),
            ],
        },
        Tab {
            key: "hot-stocks".to_string(),
            title: "ホット銘柄".to_string(),
            entries: vec![
                SymbolEntry::new("AAPL", "Apple Inc", Category::Stock),
                SymbolEntry::new("GOOGL", "Alphabet Inc Class A", Category::Stock),
                SymbolEntry::new("AMZN", "Amazon.com Inc", Category::Stock),
                SymbolEntry::new("NFLX", "Netflix Inc", Category::Stock),
                SymbolEntry::new("TSLA", "Tesla Inc", Category::Stock),
            ],
        },
    ]
}

/// 品种注册表，启动时构建，之后只读
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    tabs: Vec<Tab>,
    names: HashMap<String, String>,
    base_prices: HashMap<String, f64>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new(default_tabs(), builtin_base_prices())
    }
}

fn builtin_base_prices() -> HashMap<String, f64> {
    BASE_PRICES
        .iter()
        .map(|(symbol, price)| (symbol.to_string(), *price))
        .collect()
}

impl SymbolRegistry {
    pub fn new(tabs: Vec<Tab>, base_prices: HashMap<String, f64>) -> Self {
        let mut names = HashMap::new();
        for entry in tabs.iter().flat_map(|t| t.entries.iter()) {
            names
                .entry(entry.symbol.clone())
                .or_insert_with(|| entry.name.clone());
        }

        Self {
            tabs,
            names,
            base_prices,
        }
    }

    /// 按配置构建，未配置的部分使用内置值
    pub fn from_config(config: &WatchlistConfig) -> Self {
        let tabs = config.tabs.clone().unwrap_or_else(default_tabs);
        let mut base_prices = builtin_base_prices();
        if let Some(overrides) = &config.base_prices {
            base_prices.extend(overrides.iter().map(|(k, v)| (k.clone(), *v)));
        }
        Self::new(tabs, base_prices)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, key: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.key == key)
    }

    /// 所有标签页的品种，按显示顺序展开，重复的只保留第一次出现
    pub fn universe(&self) -> Vec<SymbolEntry> {
        let mut seen = HashSet::new();
        self.tabs
            .iter()
            .flat_map(|t| t.entries.iter())
            .filter(|e| seen.insert(e.symbol.clone()))
            .cloned()
            .collect()
    }

    /// 显示名称，未登记时返回代码本身
    pub fn display_name(&self, symbol: &str) -> String {
        self.names
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }

    /// 模拟基准价，未登记时为 100
    pub fn base_price(&self, symbol: &str) -> f64 {
        self.base_prices
            .get(symbol)
            .copied()
            .unwrap_or(DEFAULT_BASE_PRICE)
    }
}
