use actix_web::{web, HttpResponse, Result};
use crate::models::ApiResponse;
use crate::services::Dashboard;

/// 首轮刷新完成前返回 warming up
pub async fn health_check(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    let message = if dashboard.snapshot().is_empty() {
        "Service is warming up"
    } else {
        "Service is healthy"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(message)))
}

/// 刷新状态：加载中 / 错误 / 最后更新时间
pub async fn refresh_status(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    let response = ApiResponse::success(dashboard.status());
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/status", web::get().to(refresh_status));
}
