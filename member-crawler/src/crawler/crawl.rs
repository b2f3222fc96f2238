//! 定时爬取循环
//!
//! 每轮爬取：从第一个可用来源取得成员列表，对未处理过的成员校验群名片，
//! 合法的追加到记录文件，不合法的私聊提醒一次。已处理集合只在内存中保存。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::crawler::classifier::{classify, Classification};
use crate::crawler::config::Config;
use crate::crawler::error::CrawlError;
use crate::crawler::member_log::MemberLog;
use crate::crawler::sources::{GroupMember, MemberSource, ReportSink};

/// 爬取循环的等待
#[async_trait::async_trait]
pub trait Ticker: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 定时器的等待
pub struct TokioTicker;

#[async_trait::async_trait]
impl Ticker for TokioTicker {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Polling,
}

/// 一轮爬取的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub fetched: usize,
    /// 已处理过或是机器人自己
    pub skipped: usize,
    pub recorded: usize,
    pub reported: usize,
    pub report_failures: usize,
    pub record_failures: usize,
}

impl PollSummary {
    pub fn render(&self) -> String {
        format!(
            "✅ 爬取完成\n成员总数：{}\n跳过：{}\n新增记录：{}\n已提醒：{}\n提醒失败：{}\n记录失败：{}",
            self.fetched,
            self.skipped,
            self.recorded,
            self.reported,
            self.report_failures,
            self.record_failures
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatus {
    pub phase: CrawlPhase,
    pub processed: usize,
    pub log_path: PathBuf,
}

impl CrawlStatus {
    pub fn render(&self) -> String {
        let phase = match self.phase {
            CrawlPhase::Idle => "空闲",
            CrawlPhase::Polling => "爬取中",
        };
        format!(
            "📊 爬取状态：{}\n已处理成员：{}\n记录文件：{}",
            phase,
            self.processed,
            self.log_path.display()
        )
    }
}

/// 群成员爬取器
pub struct Crawler {
    config: Config,
    sources: Vec<Arc<dyn MemberSource>>,
    reporters: Vec<Arc<dyn ReportSink>>,
    log: MemberLog,
    self_id: Option<i64>,
    /// 已处理集合，同时作为爬取互斥锁
    processed: Mutex<HashSet<i64>>,
    processed_count: AtomicUsize,
}

impl Crawler {
    pub fn new(
        config: Config,
        sources: Vec<Arc<dyn MemberSource>>,
        reporters: Vec<Arc<dyn ReportSink>>,
        log: MemberLog,
        self_id: Option<i64>,
    ) -> Self {
        Self {
            config,
            sources,
            reporters,
            log,
            self_id,
            processed: Mutex::new(HashSet::new()),
            processed_count: AtomicUsize::new(0),
        }
    }

    /// 执行一轮爬取
    ///
    /// 定时爬取和手动爬取共用，同一时间只有一轮在执行。
    pub async fn poll(&self) -> Result<PollSummary, CrawlError> {
        let mut processed = self.processed.lock().await;
        log::info!("🔍 开始爬取群 {} 的成员列表", self.config.group_id);

        let members = self.fetch_members().await?;
        let mut summary = PollSummary {
            fetched: members.len(),
            ..PollSummary::default()
        };

        for member in members {
            if self.self_id == Some(member.user_id) || processed.contains(&member.user_id) {
                summary.skipped += 1;
                continue;
            }

            match classify(&member.display_name) {
                Classification::Valid(name) => {
                    let record = name.with_qq(member.user_id.to_string());
                    match self.log.append(&record).await {
                        Ok(()) => {
                            log::info!("📝 记录成员: {}", record.to_line());
                            processed.insert(member.user_id);
                            summary.recorded += 1;
                        }
                        Err(e) => {
                            // 不加入已处理集合，下轮重试
                            log::error!("❌ 成员 {} {}", member.user_id, e);
                            summary.record_failures += 1;
                        }
                    }
                }
                Classification::Invalid(raw) => {
                    match self.report(&member, &raw).await {
                        Ok(()) => summary.reported += 1,
                        Err(e) => {
                            log::warn!("⚠️  成员 {} {}", member.user_id, e);
                            summary.report_failures += 1;
                        }
                    }
                    processed.insert(member.user_id);
                }
            }
        }

        self.processed_count.store(processed.len(), Ordering::Relaxed);
        log::info!(
            "✅ 爬取完成: 成员 {}, 新增记录 {}, 提醒 {}, 提醒失败 {}, 记录失败 {}",
            summary.fetched,
            summary.recorded,
            summary.reported,
            summary.report_failures,
            summary.record_failures
        );
        Ok(summary)
    }

    /// 按顺序尝试来源，返回第一个非空列表
    async fn fetch_members(&self) -> Result<Vec<GroupMember>, CrawlError> {
        let mut any_ok = false;
        let mut last_error = None;

        for source in &self.sources {
            match source.list_members(self.config.group_id).await {
                Ok(members) if !members.is_empty() => {
                    log::debug!("来源 {} 返回 {} 个成员", source.name(), members.len());
                    return Ok(members);
                }
                Ok(_) => {
                    log::debug!("来源 {} 返回空列表", source.name());
                    any_ok = true;
                }
                Err(e) => {
                    log::warn!("⚠️  来源 {} {}", source.name(), e);
                    last_error = Some(e);
                }
            }
        }

        if any_ok {
            return Ok(Vec::new());
        }
        Err(last_error.unwrap_or_else(|| CrawlError::FetchFailed("没有可用的成员列表来源".to_string())))
    }

    /// 按顺序尝试提醒通道，第一个成功即停止
    async fn report(&self, member: &GroupMember, display_name: &str) -> Result<(), CrawlError> {
        let text = self.config.render_report(display_name);
        let mut last_error = None;

        for reporter in &self.reporters {
            match reporter.send_direct_message(member.user_id, &text).await {
                Ok(()) => {
                    log::info!(
                        "📨 已通过 {} 提醒成员 {} (群名片: {})",
                        reporter.name(),
                        member.user_id,
                        display_name
                    );
                    return Ok(());
                }
                Err(e) => {
                    log::debug!("提醒通道 {} 失败: {}", reporter.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CrawlError::DeliveryFailed("没有可用的提醒通道".to_string())))
    }

    /// 当前状态，不等待进行中的爬取
    pub fn status(&self) -> CrawlStatus {
        let (phase, processed) = match self.processed.try_lock() {
            Ok(set) => (CrawlPhase::Idle, set.len()),
            Err(_) => (
                CrawlPhase::Polling,
                self.processed_count.load(Ordering::Relaxed),
            ),
        };

        CrawlStatus {
            phase,
            processed,
            log_path: self.log.path().to_path_buf(),
        }
    }

    /// 清空已处理集合，记录文件不受影响
    ///
    /// 返回清除的数量。
    pub async fn clear_cache(&self) -> usize {
        let mut processed = self.processed.lock().await;
        let cleared = processed.len();
        processed.clear();
        self.processed_count.store(0, Ordering::Relaxed);
        log::info!("🗑️  已清除 {} 个已处理成员", cleared);
        cleared
    }

    /// 下一轮前的等待时间
    pub fn next_delay<T>(&self, result: &Result<T, CrawlError>) -> Duration {
        match result {
            Ok(_) => self.config.poll_interval(),
            Err(_) => self.config.retry_interval(),
        }
    }

    /// 定时爬取，直到收到关闭信号
    pub async fn run(self: Arc<Self>, ticker: Arc<dyn Ticker>, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "⏱️  定时爬取已启动，间隔 {} 秒，失败重试 {} 秒",
            self.config.poll_interval_secs,
            self.config.retry_interval_secs
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let result = self.poll().await;
            if let Err(e) = &result {
                log::error!("❌ {}，{} 秒后重试", e, self.config.retry_interval_secs);
            }
            let delay = self.next_delay(&result);

            tokio::select! {
                _ = ticker.sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        log::info!("⏹️  定时爬取已停止");
    }
}
