use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::qqbot::config::QuoteConfig;

const THINKING: &str = "嗯...让我想想...";
const FALLBACK_QUOTE: &str = "生活就像一盒巧克力，你永远不知道下一颗是什么味道。";

/// 每日一言来源
#[async_trait::async_trait]
pub trait QuoteService: Send + Sync {
    async fn fetch(&self) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct YiyanResponse {
    yiyan: Option<String>,
}

/// 一言 HTTP 接口
pub struct YiyanQuote {
    http_client: reqwest::Client,
    config: QuoteConfig,
}

impl YiyanQuote {
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl QuoteService for YiyanQuote {
    /// 接口正常但没有 `yiyan` 字段时返回 `Ok(None)`
    async fn fetch(&self) -> Result<Option<String>> {
        let response = self
            .http_client
            .get(&self.config.url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("一言接口状态码: {}", response.status()));
        }

        let body: YiyanResponse = response.json().await?;
        Ok(body.yiyan)
    }
}

/// 生成每日一言回复，失败时使用固定句子
pub async fn daily_quote(service: &dyn QuoteService) -> String {
    match service.fetch().await {
        Ok(Some(quote)) => format!("{}\n\n{}", THINKING, quote),
        Ok(None) => format!("今天的话...让我想想...\n\n{}", FALLBACK_QUOTE),
        Err(e) => {
            log::error!("❌ 获取每日一言失败: {}", e);
            format!("{}\n\n今天的话...\n\n{}", THINKING, FALLBACK_QUOTE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Option<Option<&'static str>>);

    #[async_trait::async_trait]
    impl QuoteService for Canned {
        async fn fetch(&self) -> Result<Option<String>> {
            match self.0 {
                Some(q) => Ok(q.map(str::to_string)),
                None => Err(anyhow!("timeout")),
            }
        }
    }

    #[tokio::test]
    async fn test_quote_success() {
        let text = daily_quote(&Canned(Some(Some("路漫漫其修远兮")))).await;
        assert_eq!(text, "嗯...让我想想...\n\n路漫漫其修远兮");
    }

    #[tokio::test]
    async fn test_quote_fallbacks() {
        let missing = daily_quote(&Canned(Some(None))).await;
        assert!(missing.starts_with("今天的话"));
        assert!(missing.ends_with(FALLBACK_QUOTE));

        let failed = daily_quote(&Canned(None)).await;
        assert!(failed.starts_with(THINKING));
        assert!(failed.ends_with(FALLBACK_QUOTE));
    }
}
