use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::qqbot::error::QqBotError;

/// 用户 ID -> 用户资料
pub type Profiles = BTreeMap<String, UserProfile>;

/// 用户资料
///
/// 字段名与旧版 `users.json` 保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 绑定的 QQ 号，绑定后不可更改
    #[serde(rename = "qq", default, skip_serializing_if = "Option::is_none")]
    pub external_account: Option<String>,
    /// 最近一次签到成功的日期
    #[serde(rename = "last_sign", default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<NaiveDate>,
    /// 入币余额
    #[serde(default)]
    pub coins: u64,
    /// 当前等级内的经验
    #[serde(rename = "exp", default)]
    pub experience: u64,
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            external_account: None,
            last_check_in: None,
            coins: 0,
            experience: 0,
            level: default_level(),
        }
    }
}

/// 旧版私聊会话键，形如 `aiocqhttp:FriendMessage:10001`
const LEGACY_FRIEND_SEGMENT: &str = ":FriendMessage:";

/// 旧版私聊会话键中的 QQ 号
fn legacy_friend_id(key: &str) -> Option<&str> {
    let (_, id) = key.split_once(LEGACY_FRIEND_SEGMENT)?;
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

/// 把旧版私聊会话键改为 QQ 号，返回迁移的数量
///
/// 目标键已存在时保留旧记录不动。群聊会话键无法对应到个人，不迁移。
pub fn migrate_legacy_keys(users: &mut Profiles) -> usize {
    let legacy: Vec<(String, String)> = users
        .keys()
        .filter_map(|key| legacy_friend_id(key).map(|id| (key.clone(), id.to_string())))
        .collect();

    let mut moved = 0;
    for (old_key, id) in legacy {
        if users.contains_key(&id) {
            log::warn!("⚠️  旧用户键 {} 与 {} 冲突，保留原记录", old_key, id);
            continue;
        }
        if let Some(profile) = users.remove(&old_key) {
            users.insert(id, profile);
            moved += 1;
        }
    }
    moved
}

/// 用户数据的持久化后端
pub trait ProfileSink: Send + Sync {
    fn read_all(&self) -> Result<Profiles, QqBotError>;
    fn write_all(&self, profiles: &Profiles) -> Result<(), QqBotError>;
}

/// 单个 JSON 文件的持久化实现
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileSink for JsonFileSink {
    fn read_all(&self) -> Result<Profiles, QqBotError> {
        if !self.path.exists() {
            log::info!("用户数据文件 {:?} 不存在，返回空数据", self.path);
            return Ok(Profiles::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| QqBotError::PersistenceFailed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| QqBotError::PersistenceFailed(e.to_string()))
    }

    fn write_all(&self, profiles: &Profiles) -> Result<(), QqBotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| QqBotError::PersistenceFailed(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(profiles)
            .map_err(|e| QqBotError::PersistenceFailed(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| QqBotError::PersistenceFailed(e.to_string()))
    }
}

/// 用户数据仓库
///
/// 读失败按空数据处理，写失败只记录日志。
/// 所有读-改-写操作都经过 [`UserStore::transact`]，同一时间只有一个在执行。
pub struct UserStore {
    sink: Box<dyn ProfileSink>,
    lock: Mutex<()>,
}

impl UserStore {
    pub fn new(sink: Box<dyn ProfileSink>) -> Self {
        Self {
            sink,
            lock: Mutex::new(()),
        }
    }

    /// 读取全部用户数据
    pub fn load(&self) -> Profiles {
        match self.sink.read_all() {
            Ok(users) => {
                log::debug!("读取用户数据成功: {} 个用户", users.len());
                users
            }
            Err(e) => {
                log::error!("❌ 读取用户数据失败: {}", e);
                Profiles::new()
            }
        }
    }

    /// 保存全部用户数据
    pub fn save(&self, users: &Profiles) {
        match self.sink.write_all(users) {
            Ok(()) => log::debug!("保存用户数据成功: {} 个用户", users.len()),
            Err(e) => log::error!("❌ 保存用户数据失败: {}", e),
        }
    }

    /// 迁移旧版用户键，有变化时写回
    pub async fn migrate_legacy_keys(&self) -> usize {
        let _guard = self.lock.lock().await;
        let mut users = self.load();
        let moved = migrate_legacy_keys(&mut users);
        if moved > 0 {
            log::info!("🔄 已迁移 {} 个旧版用户键", moved);
            self.save(&users);
        }
        moved
    }

    /// 在锁内执行一次读-改-写
    ///
    /// `f` 返回 `Err` 时不写回。
    pub async fn transact<T, E>(
        &self,
        f: impl FnOnce(&mut Profiles) -> Result<T, E>,
    ) -> Result<T, E> {
        let _guard = self.lock.lock().await;
        let mut users = self.load();
        let out = f(&mut users)?;
        self.save(&users);
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// 内存中的持久化后端，可模拟读写失败
    #[derive(Default)]
    pub(crate) struct MemorySink {
        pub data: StdMutex<Profiles>,
        pub fail_read: bool,
        pub fail_write: bool,
    }

    impl ProfileSink for MemorySink {
        fn read_all(&self) -> Result<Profiles, QqBotError> {
            if self.fail_read {
                return Err(QqBotError::PersistenceFailed("read".to_string()));
            }
            Ok(self.data.lock().unwrap().clone())
        }

        fn write_all(&self, profiles: &Profiles) -> Result<(), QqBotError> {
            if self.fail_write {
                return Err(QqBotError::PersistenceFailed("write".to_string()));
            }
            *self.data.lock().unwrap() = profiles.clone();
            Ok(())
        }
    }

    #[test]
    fn test_legacy_json_layout() {
        let json = r#"{
            "aiocqhttp:FriendMessage:10001": {
                "qq": "123456",
                "last_sign": "2024-05-01",
                "coins": 42,
                "exp": 17,
                "level": 2
            },
            "aiocqhttp:FriendMessage:10002": { "qq": "654321" }
        }"#;

        let users: Profiles = serde_json::from_str(json).unwrap();
        let first = &users["aiocqhttp:FriendMessage:10001"];
        assert_eq!(first.external_account.as_deref(), Some("123456"));
        assert_eq!(first.last_check_in, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(first.coins, 42);
        assert_eq!(first.experience, 17);
        assert_eq!(first.level, 2);

        let second = &users["aiocqhttp:FriendMessage:10002"];
        assert_eq!(second.level, 1);
        assert_eq!(second.coins, 0);
        assert!(second.last_check_in.is_none());
    }

    #[tokio::test]
    async fn test_migrate_legacy_friend_keys() {
        let json = r#"{
            "aiocqhttp:FriendMessage:10001": { "qq": "123456", "coins": 42 },
            "aiocqhttp:GroupMessage:777": { "qq": "222222" },
            "aiocqhttp:FriendMessage:10003": { "qq": "333333" },
            "10003": { "qq": "444444" }
        }"#;
        let sink = MemorySink {
            data: StdMutex::new(serde_json::from_str(json).unwrap()),
            ..MemorySink::default()
        };
        let store = UserStore::new(Box::new(sink));

        assert_eq!(store.migrate_legacy_keys().await, 1);

        let users = store.load();
        assert_eq!(users["10001"].coins, 42);
        assert!(!users.contains_key("aiocqhttp:FriendMessage:10001"));
        // 群聊键和冲突键保持原样
        assert!(users.contains_key("aiocqhttp:GroupMessage:777"));
        assert_eq!(users["10003"].external_account.as_deref(), Some("444444"));
        assert!(users.contains_key("aiocqhttp:FriendMessage:10003"));

        assert_eq!(store.migrate_legacy_keys().await, 0);
    }

    #[test]
    fn test_json_file_sink_roundtrip_keeps_chinese() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("nested").join("users.json"));

        assert!(sink.read_all().unwrap().is_empty());

        let mut users = Profiles::new();
        users.insert(
            "用户".to_string(),
            UserProfile {
                external_account: Some("10086".to_string()),
                ..UserProfile::default()
            },
        );
        sink.write_all(&users).unwrap();

        let raw = fs::read_to_string(sink.path()).unwrap();
        assert!(raw.contains("用户"));
        assert!(raw.contains("\"qq\": \"10086\""));
        assert_eq!(sink.read_all().unwrap(), users);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "{ not json").unwrap();

        let store = UserStore::new(Box::new(JsonFileSink::new(&path)));
        assert!(store.load().is_empty());
    }

    #[tokio::test]
    async fn test_transact_skips_write_on_error() {
        let store = UserStore::new(Box::new(MemorySink::default()));

        let result: Result<(), &str> = store
            .transact(|users| {
                users.insert("a".to_string(), UserProfile::default());
                Err("nope")
            })
            .await;
        assert!(result.is_err());
        assert!(store.load().is_empty());

        store
            .transact(|users| {
                users.insert("a".to_string(), UserProfile::default());
                Ok::<_, ()>(())
            })
            .await
            .unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let sink = MemorySink {
            fail_write: true,
            ..MemorySink::default()
        };
        let store = UserStore::new(Box::new(sink));

        let out = store
            .transact(|users| {
                users.insert("a".to_string(), UserProfile::default());
                Ok::<_, ()>(7)
            })
            .await;
        assert_eq!(out, Ok(7));
        assert!(store.load().is_empty());
    }
}
