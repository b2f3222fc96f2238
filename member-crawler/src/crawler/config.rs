use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 是否启用定时爬取，关闭后仍可手动爬取
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 要巡检的群号，0 表示未配置
    #[serde(default)]
    pub group_id: i64,
    /// 成员记录文件名（相对插件数据目录）
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// 爬取成功后的间隔（秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// 爬取失败后的重试间隔（秒）
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
    /// 群名片不合规时的私聊提醒，`{name}` 替换为当前群名片
    #[serde(default = "default_report_message")]
    pub report_message: String,
}

fn default_enabled() -> bool {
    true
}

fn default_log_file() -> String {
    "members.txt".to_string()
}

fn default_poll_interval() -> u64 {
    300
}

fn default_retry_interval() -> u64 {
    60
}

fn default_report_message() -> String {
    "你好，你的群名片「{name}」不符合格式要求，请修改为：组号组-迷你名字(迷你名字)-迷你号(迷你号)，例如：1组-爱豆(迷你名字)-10001(迷你号)".to_string()
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn render_report(&self, display_name: &str) -> String {
        self.report_message.replace("{name}", display_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: default_enabled(),
            group_id: 0,
            log_file: default_log_file(),
            poll_interval_secs: default_poll_interval(),
            retry_interval_secs: default_retry_interval(),
            report_message: default_report_message(),
        }
    }
}

/// 加载配置文件
/// 如果配置文件不存在，会创建一个默认配置文件
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    if !path.exists() {
        let default_config = Config::default();
        save_config(path, &default_config)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;

    Ok(config)
}

/// 保存配置文件
pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;

    Ok(())
}
