//! # 群成员爬取
//!
//! 定时获取群成员列表，按群名片格式分类：
//! - 合法名片解析出迷你号与组号，追加写入成员记录文件
//! - 不合法名片私聊提醒成员修改
//!
//! 每个成员在一次进程生命周期内只处理一次，可通过管理指令清除。

mod classifier;
mod config;
mod crawl;
mod error;
mod member_log;
mod onebot;
mod sources;

// 公开导出
pub use classifier::{classify, Classification, MemberName, MemberRecord};
pub use config::{load_config, save_config, Config};
pub use crawl::{CrawlPhase, CrawlStatus, Crawler, PollSummary, Ticker, TokioTicker};
pub use error::CrawlError;
pub use member_log::MemberLog;
pub use onebot::{login_id, parse_member_list, OneBotMembers, OneBotPrivateMessage};
pub use sources::{GroupMember, MemberSource, ReportSink};
