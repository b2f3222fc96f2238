use thiserror::Error;

/// 爬取过程中的错误
///
/// 都不会中断爬取循环：来源失败换下一个来源或延后重试，提醒失败换下一个通道。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("获取群成员列表失败: {0}")]
    FetchFailed(String),
    #[error("发送提醒失败: {0}")]
    DeliveryFailed(String),
    #[error("写入成员记录失败: {0}")]
    PersistenceFailed(String),
}
