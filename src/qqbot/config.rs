use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    /// 用户数据文件名（相对插件数据目录）
    #[serde(default = "default_users_file")]
    pub users_file: String,
    /// 签到随机数种子，设为 None 使用系统熵
    #[serde(default)]
    pub reward_seed: Option<u64>,
}

fn default_users_file() -> String {
    "users.json".to_string()
}

/// 天气查询配置（聚合数据 simpleWeather 接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_url() -> String {
    "https://apis.juhe.cn/simpleWeather/query".to_string()
}

fn default_weather_timeout() -> u64 {
    5
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            url: default_weather_url(),
            key: String::new(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_url")]
    pub url: String,
    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,
}

fn default_quote_url() -> String {
    "https://api.nxvav.cn/api/yiyan/?encode=json&charset=utf-8".to_string()
}

fn default_quote_timeout() -> u64 {
    10
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            url: default_quote_url(),
            timeout_secs: default_quote_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weather: WeatherConfig::default(),
            quote: QuoteConfig::default(),
            users_file: default_users_file(),
            reward_seed: None,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "weather": { "key": "abc" } }"#).unwrap();

        assert_eq!(config.weather.key, "abc");
        assert_eq!(config.weather.timeout_secs, 5);
        assert_eq!(config.weather.url, default_weather_url());
        assert_eq!(config.quote.timeout_secs, 10);
        assert_eq!(config.users_file, "users.json");
        assert!(config.reward_seed.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        // 不存在时写出默认配置
        let created = load_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.users_file, "users.json");

        let mut config = Config::default();
        config.weather.key = "test-key".to_string();
        config.reward_seed = Some(9);
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.weather.key, "test-key");
        assert_eq!(loaded.reward_seed, Some(9));
    }
}
