//! 公共常量和辅助函数

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;

/// 请求头 User-Agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 按配置创建 HTTP 客户端（带超时）
pub fn build_client(config: &ProviderConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// 解析接口根地址，未配置时使用数据源默认地址
pub fn parse_base_url(configured: Option<&str>, default: &str) -> Result<Url> {
    let raw = configured.unwrap_or(default);
    Url::parse(raw).map_err(|e| anyhow!("无效的接口地址 {}: {}", raw, e))
}

/// 在根地址后追加路径段，每段单独编码（代码中的 / 等字符不会破坏路径）
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("接口地址不能作为路径前缀: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// 发送 GET 请求并解析 JSON，非 2xx 状态视为失败
pub async fn get_json(client: &Client, url: Url) -> Result<Value> {
    log::debug!("📡 请求 URL: {}", url);

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("请求失败: {}", response.status()));
    }

    let json: Value = response.json().await?;
    Ok(json)
}

/// 读取必须为正数的价格字段
pub fn positive_field(value: &Value, field: &str) -> Result<f64> {
    match value[field].as_f64() {
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        Some(v) => Err(anyhow!("字段 {} 数值无效: {}", field, v)),
        None => Err(anyhow!("缺少字段 {}", field)),
    }
}
