//! # QQBot - 实用指令集合
//!
//! 提供以下指令：
//! - **帮助 / 关于本机**：静态文本
//! - **运行状态**：服务器 CPU、内存、磁盘与运行时间
//! - **天气**：聚合数据天气查询
//! - **每日一言**：一言接口，失败时使用固定句子
//! - **绑定**：一个用户绑定一个 QQ 号，QQ 号不可重复
//! - **签到**：每日签到获得入币与经验，经验满后升级

mod binding;
mod checkin;
mod commands;
mod config;
mod error;
mod quote;
mod status;
mod store;
mod weather;

// 公开导出
pub use binding::{bind, is_valid_account};
pub use checkin::{
    check_in, check_in_with_reward, threshold_for, CheckInOutcome, RewardDice, REWARD_RANGE,
};
pub use commands::{Command, QqBot, ABOUT_TEXT, HELP_TEXT};
pub use config::{load_config, save_config, Config, QuoteConfig, WeatherConfig};
pub use error::QqBotError;
pub use quote::{daily_quote, QuoteService, YiyanQuote};
pub use status::ServerStatus;
pub use store::{migrate_legacy_keys, JsonFileSink, ProfileSink, Profiles, UserProfile, UserStore};
pub use weather::{format_weather, normalize_city, weather_report, JuheWeather, WeatherError, WeatherService};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
