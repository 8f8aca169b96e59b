//! 行情看板接口处理器
//!
//! ## API 列表
//! - GET /snapshot - 当前完整快照
//! - GET /tabs - 标签页及品种
//! - GET /tabs/{tab} - 标签页卡片（按显示顺序，未获取到的为 null）
//! - GET /stocks/{symbol} - 单只股票记录
//! - GET /stocks/{symbol}/chart - 价格走势图数据
//! - POST /refresh - 立即刷新

use actix_web::{web, HttpResponse, Result};
use crate::models::{
    ApiResponse, ChartPoint, RefreshOutcome, Snapshot, StockRecord, Tab, TabView,
};
use crate::services::Dashboard;

pub async fn get_snapshot(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    let snapshot = dashboard.snapshot();
    let response = ApiResponse::<&Snapshot>::success(snapshot.as_ref());
    Ok(HttpResponse::Ok().json(response))
}

pub async fn list_tabs(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    let response = ApiResponse::<&[Tab]>::success(dashboard.registry().tabs());
    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_tab(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let key = path.into_inner();

    match dashboard.tab_view(&key) {
        Some(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        None => {
            let response = ApiResponse::<TabView>::error(format!("标签页 {} 不存在", key));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

pub async fn get_stock(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let snapshot = dashboard.snapshot();

    match snapshot.get(&symbol) {
        Some(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        None => {
            let response = ApiResponse::<StockRecord>::error(format!("{} 数据获取中", symbol));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

pub async fn get_stock_chart(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();

    match dashboard.chart_series(&symbol) {
        Some(series) => Ok(HttpResponse::Ok().json(ApiResponse::success(series))),
        None => {
            let response = ApiResponse::<Vec<ChartPoint>>::error(format!("{} 数据获取中", symbol));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

pub async fn trigger_refresh(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    match dashboard.refresh().await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ApiResponse::success(outcome))),
        Err(e) => {
            let response = ApiResponse::<RefreshOutcome>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/snapshot", web::get().to(get_snapshot))
        .route("/refresh", web::post().to(trigger_refresh))
        .service(
            web::scope("/tabs")
                .route("", web::get().to(list_tabs))
                .route("/{tab}", web::get().to(get_tab))
        )
        .service(
            web::scope("/stocks")
                .route("/{symbol}", web::get().to(get_stock))
                .route("/{symbol}/chart", web::get().to(get_stock_chart))
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use std::collections::HashMap;
    use std::sync::Arc;
    use crate::config::RefreshConfig;
    use crate::services::provider::OfflineProvider;
    use crate::services::{MockDataGenerator, StockPipeline, SymbolRegistry};

    fn offline_dashboard() -> web::Data<Dashboard> {
        let registry = Arc::new(SymbolRegistry::default());
        let mock = Arc::new(MockDataGenerator::seeded(registry.clone(), 21));
        let pipeline = StockPipeline::new(Arc::new(OfflineProvider), mock.clone(), &RefreshConfig::default());
        web::Data::new(Dashboard::new(registry, pipeline, mock, chrono_tz::Asia::Tokyo))
    }

    #[actix_web::test]
    async fn test_refresh_then_read_tab() {
        let dashboard = offline_dashboard();
        let app = test::init_service(
            App::new()
                .app_data(dashboard.clone())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/stocks/NVDA").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::post().uri("/api/v1/refresh").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["synthetic"], 10);

        let req = test::TestRequest::get().uri("/api/v1/tabs/watchlist").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let cards = body["data"]["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0]["entry"]["symbol"], "SOXL");
        assert_eq!(cards[0]["record"]["quote_source"], "synthetic");

        let req = test::TestRequest::get().uri("/api/v1/stocks/QQQ/chart").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 24);

        let req = test::TestRequest::get().uri("/api/v1/status").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["state"], "idle");
        assert!(body["data"]["last_updated"].is_string());
    }

    #[actix_web::test]
    async fn test_unknown_tab_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(offline_dashboard())
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/tabs/crypto").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::get().uri("/api/v1/tabs").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_failed_refresh_is_server_error() {
        let registry = Arc::new(SymbolRegistry::new(Vec::new(), HashMap::new()));
        let mock = Arc::new(MockDataGenerator::seeded(registry.clone(), 21));
        let pipeline = StockPipeline::new(Arc::new(OfflineProvider), mock.clone(), &RefreshConfig::default());
        let dashboard = web::Data::new(Dashboard::new(registry, pipeline, mock, chrono_tz::Asia::Tokyo));
        let app = test::init_service(
            App::new()
                .app_data(dashboard)
                .configure(crate::handlers::config),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/refresh").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["message"], "关注列表为空");

        let req = test::TestRequest::get().uri("/api/v1/status").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["last_error"], "关注列表为空");
        assert_eq!(body["data"]["records"], 0);

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], "Service is warming up");
    }
}
