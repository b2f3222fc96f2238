//! 天气查询
//!
//! 使用聚合数据 simpleWeather 接口，所有失败都转成一行文本直接回复给用户。

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::qqbot::config::WeatherConfig;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("查询失败: {0}重新发送/天气 城市 重试")]
    Rejected(String),
    #[error("请求失败，状态码: {0}")]
    Status(u16),
    #[error("请求异常: {0}")]
    Request(String),
}

/// 天气数据来源
#[async_trait::async_trait]
pub trait WeatherService: Send + Sync {
    /// 返回接口的 `result` 对象
    async fn query(&self, city: &str) -> Result<Value, WeatherError>;
}

/// 聚合数据天气接口
pub struct JuheWeather {
    http_client: reqwest::Client,
    config: WeatherConfig,
}

impl JuheWeather {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl WeatherService for JuheWeather {
    async fn query(&self, city: &str) -> Result<Value, WeatherError> {
        let response = self
            .http_client
            .get(&self.config.url)
            .query(&[("key", self.config.key.as_str()), ("city", city)])
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let reason = data.get("reason").and_then(Value::as_str).unwrap_or_default();
        if reason == "查询成功!" || reason == "查询成功" {
            Ok(data.get("result").cloned().unwrap_or(Value::Null))
        } else {
            Err(WeatherError::Rejected(reason.to_string()))
        }
    }
}

/// 去掉地名末尾的 市/县/区
pub fn normalize_city(location: &str) -> &str {
    location
        .trim_end_matches('市')
        .trim_end_matches('县')
        .trim_end_matches('区')
}

/// 字段转文本，字符串不带引号，缺失为空
fn field(obj: &Value, key: &str) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 格式化天气信息
pub fn format_weather(city: &str, result: &Value) -> String {
    let empty = Value::Null;
    let realtime = match result.get("realtime") {
        Some(v @ Value::Object(_)) => v,
        _ => &empty,
    };

    let mut text = format!("\n{}实时天气:\n", city);
    text.push_str(&format!(
        "{}, 温度: {}℃, 湿度: {}%, 风向: {}, 风力: {}级, AQI: {}",
        field(realtime, "info"),
        field(realtime, "temperature"),
        field(realtime, "humidity"),
        field(realtime, "direct"),
        field(realtime, "power"),
        field(realtime, "aqi"),
    ));
    text.push_str("\n未来几天的天气:🌤⛈️☔️");

    if let Some(days) = result.get("future").and_then(Value::as_array) {
        for day in days.iter().filter(|d| d.is_object()) {
            text.push_str(&format!(
                "\n日期: {}, 天气: {}, 温度: {}, 风向: {}",
                field(day, "date"),
                field(day, "weather"),
                field(day, "temperature"),
                field(day, "direct"),
            ));
        }
    }

    text
}

/// 查询并生成回复文本
pub async fn weather_report(service: &dyn WeatherService, location: &str) -> String {
    let city = normalize_city(location);
    match service.query(city).await {
        Ok(result) => format_weather(city, &result),
        Err(e) => {
            log::warn!("⚠️  天气查询失败 [{}]: {}", city, e);
            e.to_string()
        }
    }
}
