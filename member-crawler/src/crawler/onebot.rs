//! 基于 Kovi RuntimeBot 的 OneBot v11 实现

use kovi::RuntimeBot;
use serde_json::Value;
use std::sync::Arc;

use crate::crawler::error::CrawlError;
use crate::crawler::sources::{GroupMember, MemberSource, ReportSink};

/// QQ 号在不同实现里可能是数字或字符串
fn as_user_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// 解析 `get_group_member_list` 的 data 字段
pub fn parse_member_list(data: &Value) -> Result<Vec<GroupMember>, CrawlError> {
    let entries = data
        .as_array()
        .ok_or_else(|| CrawlError::FetchFailed(format!("成员列表格式错误: {}", data)))?;

    let members = entries
        .iter()
        .filter_map(|entry| {
            let user_id = entry.get("user_id").and_then(as_user_id)?;
            let card = entry.get("card").and_then(Value::as_str).unwrap_or_default();
            let name = if card.trim().is_empty() {
                entry.get("nickname").and_then(Value::as_str).unwrap_or_default()
            } else {
                card
            };
            Some(GroupMember::new(user_id, name))
        })
        .collect();

    Ok(members)
}

/// 获取机器人自身 QQ 号
pub async fn login_id(bot: &RuntimeBot) -> Option<i64> {
    match bot.get_login_info().await {
        Ok(info) => info.data.get("user_id").and_then(as_user_id),
        Err(e) => {
            log::warn!("⚠️  获取登录信息失败: status {}, retcode {}", e.status, e.retcode);
            None
        }
    }
}

/// 通过 `get_group_member_list` 获取成员
pub struct OneBotMembers {
    bot: Arc<RuntimeBot>,
}

impl OneBotMembers {
    pub fn new(bot: Arc<RuntimeBot>) -> Self {
        Self { bot }
    }
}

#[async_trait::async_trait]
impl MemberSource for OneBotMembers {
    fn name(&self) -> &str {
        "onebot"
    }

    async fn list_members(&self, group_id: i64) -> Result<Vec<GroupMember>, CrawlError> {
        match self.bot.get_group_member_list(group_id).await {
            Ok(ret) => parse_member_list(&ret.data),
            Err(e) => Err(CrawlError::FetchFailed(format!(
                "status {}, retcode {}",
                e.status, e.retcode
            ))),
        }
    }
}

/// 通过 `send_private_msg` 发送私聊
pub struct OneBotPrivateMessage {
    bot: Arc<RuntimeBot>,
}

impl OneBotPrivateMessage {
    pub fn new(bot: Arc<RuntimeBot>) -> Self {
        Self { bot }
    }
}

#[async_trait::async_trait]
impl ReportSink for OneBotPrivateMessage {
    fn name(&self) -> &str {
        "onebot"
    }

    async fn send_direct_message(&self, target_id: i64, text: &str) -> Result<(), CrawlError> {
        self.bot
            .send_private_msg_return(target_id, text.to_string())
            .await
            .map(|_| ())
            .map_err(|e| {
                CrawlError::DeliveryFailed(format!("status {}, retcode {}", e.status, e.retcode))
            })
    }
}
