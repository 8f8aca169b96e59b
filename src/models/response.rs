//! 接口统一响应格式

use serde::{Deserialize, Serialize};
use chrono::Utc;

/// 统一 API 响应结构，失败时 data 为 null，message 为错误信息
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    /// 响应时间（UTC，RFC 3339）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::build(true, Some(data), "Success".to_string())
    }

    pub fn error(message: String) -> Self {
        Self::build(false, None, message)
    }

    fn build(success: bool, data: Option<T>, message: String) -> Self {
        Self {
            success,
            data,
            message,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
