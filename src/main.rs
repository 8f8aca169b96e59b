//! 行情看板后端服务
//!
//! 定时获取关注列表中各品种的行情与历史数据，计算涨跌及多周期对比，
//! 通过 RESTful API 提供给前端渲染
//! 数据来源：Polygon、Yahoo Finance，获取失败时使用模拟数据

mod config;     // 配置
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use std::sync::Arc;

use actix_web::{web, App, HttpServer, middleware::Logger};
use env_logger::Env;

use crate::config::AppConfig;
use crate::services::provider::build_provider;
use crate::services::{Dashboard, MockDataGenerator, RefreshScheduler, StockPipeline, SymbolRegistry};

/// 应用程序入口
///
/// 启动定时刷新和 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    source.report();

    let timezone = config.display.tz()?;
    let registry = Arc::new(SymbolRegistry::from_config(&config.watchlist));
    let mock = Arc::new(MockDataGenerator::new(registry.clone()));
    let provider = build_provider(&config.provider)?;
    let pipeline = StockPipeline::new(provider, mock.clone(), &config.refresh);
    let dashboard = Arc::new(Dashboard::new(registry, pipeline, mock, timezone));

    log::info!(
        "启动行情看板服务: {} 个品种, 流水线 {:?}",
        dashboard.registry().universe().len(),
        config.refresh.pipeline
    );

    let scheduler = RefreshScheduler::start(dashboard.clone(), config.refresh.interval());
    let data = web::Data::from(dashboard);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(data.clone())
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;

    scheduler.stop().await;
    Ok(())
}
