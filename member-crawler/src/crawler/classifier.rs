//! 群名片格式校验
//!
//! 合法格式：`组号组-迷你名字(标注)-迷你号(标注)`，例如 `1组-爱豆(迷你名字)-10001(迷你号)`。
//! 必须整串匹配。

use regex::Regex;
use std::sync::OnceLock;

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+)组-([^-]+)\(([^()]+)\)-(\d+)\(([^()]+)\)$").expect("群名片正则无效")
    })
}

/// 从合法群名片中解析出的信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    pub group_number: String,
    pub mini_id: String,
}

impl MemberName {
    /// 附上成员 QQ 号生成记录
    pub fn with_qq(self, qq_id: impl Into<String>) -> MemberRecord {
        MemberRecord {
            mini_id: self.mini_id,
            group_number: self.group_number,
            qq_id: qq_id.into(),
        }
    }
}

/// 写入成员记录文件的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub mini_id: String,
    pub group_number: String,
    pub qq_id: String,
}

impl MemberRecord {
    /// 记录行格式：`迷你号:组号:迷你号:QQ号`
    ///
    /// 迷你号出现两次，与已有的记录文件保持一致。
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.mini_id, self.group_number, self.mini_id, self.qq_id
        )
    }
}

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Valid(MemberName),
    /// 不符合格式，保留原始名片用于提醒
    Invalid(String),
}

pub fn classify(display_name: &str) -> Classification {
    match name_regex().captures(display_name) {
        Some(caps) => Classification::Valid(MemberName {
            group_number: caps[1].to_string(),
            mini_id: caps[4].to_string(),
        }),
        None => Classification::Invalid(display_name.to_string()),
    }
}
