use chrono::{Local, NaiveDate};
use std::path::Path;
use tokio::sync::Mutex;

use crate::qqbot::binding;
use crate::qqbot::checkin::{self, RewardDice};
use crate::qqbot::config::Config;
use crate::qqbot::error::QqBotError;
use crate::qqbot::quote::{self, QuoteService, YiyanQuote};
use crate::qqbot::status::ServerStatus;
use crate::qqbot::store::{JsonFileSink, UserStore};
use crate::qqbot::weather::{self, JuheWeather, WeatherService};

pub const HELP_TEXT: &str = "🤖 机器人帮助信息：
- 运行状态：查看服务器资源
- 帮助：显示此帮助信息
- 关于本机：查看机器人信息
- 天气：查询天气（如：天气 北京）
- 每日一言：获取每日一句名言
- 绑定：绑定QQ号
- 签到：每日签到获得奖励";

pub const ABOUT_TEXT: &str = "版本：0.0.1-beta
开发者：简单工作室  X 创海云科技
       -奇の简服务器专属bot-";

/// 指令词后为空或以空白分隔时返回参数部分
fn argument_of<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// 支持的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    About,
    Status,
    Weather(String),
    Quote,
    Bind(String),
    CheckIn,
}

impl Command {
    /// 解析消息文本，允许带 `/` 前缀
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('/').unwrap_or(text).trim_start();

        match text {
            "帮助" => return Some(Command::Help),
            "关于本机" => return Some(Command::About),
            "运行状态" => return Some(Command::Status),
            "每日一言" => return Some(Command::Quote),
            "签到" => return Some(Command::CheckIn),
            _ => {}
        }

        if let Some(rest) = argument_of(text, "天气") {
            return Some(Command::Weather(rest.to_string()));
        }
        if let Some(rest) = argument_of(text, "绑定") {
            return Some(Command::Bind(rest.to_string()));
        }

        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "帮助",
            Command::About => "关于本机",
            Command::Status => "运行状态",
            Command::Weather(_) => "天气",
            Command::Quote => "每日一言",
            Command::Bind(_) => "绑定",
            Command::CheckIn => "签到",
        }
    }
}

/// 指令处理器
pub struct QqBot {
    store: UserStore,
    dice: Mutex<RewardDice>,
    weather: Box<dyn WeatherService>,
    quote: Box<dyn QuoteService>,
}

impl QqBot {
    /// 按配置创建，用户数据存放在 `data_dir` 下
    pub fn new(config: &Config, data_dir: &Path) -> Self {
        let users_path = data_dir.join(&config.users_file);
        log::info!("📁 用户数据文件: {:?}", users_path);

        Self::with_services(
            UserStore::new(Box::new(JsonFileSink::new(users_path))),
            RewardDice::from_seed_option(config.reward_seed),
            Box::new(JuheWeather::new(config.weather.clone())),
            Box::new(YiyanQuote::new(config.quote.clone())),
        )
    }

    pub fn with_services(
        store: UserStore,
        dice: RewardDice,
        weather: Box<dyn WeatherService>,
        quote: Box<dyn QuoteService>,
    ) -> Self {
        Self {
            store,
            dice: Mutex::new(dice),
            weather,
            quote,
        }
    }

    /// 执行指令并返回回复文本
    pub async fn handle(&self, user_id: &str, command: Command) -> String {
        log::info!("执行{}命令 (user: {})", command.name(), user_id);

        match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::About => ABOUT_TEXT.to_string(),
            Command::Status => ServerStatus::collect().await.render(),
            Command::Weather(location) => {
                if location.is_empty() {
                    return "请输入地名，例如：天气 北京".to_string();
                }
                weather::weather_report(self.weather.as_ref(), &location).await
            }
            Command::Quote => quote::daily_quote(self.quote.as_ref()).await,
            Command::Bind(account) => self
                .bind(user_id, &account)
                .await
                .unwrap_or_else(|e| e.to_string()),
            Command::CheckIn => self
                .check_in(user_id, Local::now().date_naive())
                .await
                .unwrap_or_else(|e| e.to_string()),
        }
    }

    /// 绑定 QQ 号
    pub async fn bind(&self, user_id: &str, account: &str) -> Result<String, QqBotError> {
        self.store
            .transact(|users| {
                let profile = binding::bind(user_id, users, account)?;
                users.insert(user_id.to_string(), profile);
                Ok::<_, QqBotError>(())
            })
            .await
            .map_err(|e| {
                log::info!("绑定未完成 (user: {}): {}", user_id, e);
                e
            })?;

        log::info!("✅ 用户 {} 绑定 QQ 号 {}", user_id, account);
        Ok(format!("✅ 绑定成功！你的QQ号已保存：{}", account))
    }

    /// 签到
    pub async fn check_in(&self, user_id: &str, today: NaiveDate) -> Result<String, QqBotError> {
        let mut dice = self.dice.lock().await;

        let outcome = self
            .store
            .transact(|users| {
                let profile = users.get(user_id).ok_or(QqBotError::NotBound)?;
                let (updated, outcome) = checkin::check_in(profile, today, &mut dice)?;
                users.insert(user_id.to_string(), updated);
                Ok::<_, QqBotError>(outcome)
            })
            .await?;

        log::info!(
            "✅ 用户 {} 签到: +{} 入币, Lv.{} ({}/{})",
            user_id,
            outcome.reward,
            outcome.level,
            outcome.experience,
            outcome.next_threshold
        );

        let emoji = dice.pick_emoji();
        Ok(outcome.render(emoji))
    }

    /// 启动时把旧版会话键迁移为 QQ 号
    pub async fn migrate_legacy_users(&self) -> usize {
        self.store.migrate_legacy_keys().await
    }

    #[cfg(test)]
    pub fn store(&self) -> &UserStore {
        &self.store
    }
}
