use crate::crawler::error::CrawlError;

/// 群成员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub user_id: i64,
    /// 群名片，为空时使用昵称
    pub display_name: String,
}

impl GroupMember {
    pub fn new(user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// 群成员列表来源
///
/// 按注册顺序依次尝试，第一个返回非空列表的来源生效。
#[async_trait::async_trait]
pub trait MemberSource: Send + Sync {
    fn name(&self) -> &str;
    async fn list_members(&self, group_id: i64) -> Result<Vec<GroupMember>, CrawlError>;
}

/// 私聊提醒通道
///
/// 按注册顺序依次尝试，第一个发送成功的通道生效。
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &str;
    async fn send_direct_message(&self, target_id: i64, text: &str) -> Result<(), CrawlError>;
}
