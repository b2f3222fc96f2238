pub mod crawler;

use kovi::PluginBuilder as plugin;
use std::sync::Arc;
use tokio::sync::watch;
use crate::crawler::{
    load_config, login_id, Crawler, MemberLog, MemberSource, OneBotMembers, OneBotPrivateMessage,
    ReportSink, TokioTicker,
};

#[kovi::plugin]
async fn main() {
    let bot = plugin::get_runtime_bot();
    let data_path = bot.get_data_path();
    let config_json_path = data_path.join("config.json");

    // 加载配置
    let config = match load_config(&config_json_path) {
        Ok(cfg) => {
            kovi::log::info!("✅ 成功加载配置: {:?}", config_json_path);
            cfg
        }
        Err(e) => {
            kovi::log::error!("❌ 加载配置失败: {}, 使用默认配置", e);
            crawler::Config::default()
        }
    };

    let self_id = login_id(&bot).await;
    let sources: Vec<Arc<dyn MemberSource>> = vec![Arc::new(OneBotMembers::new(bot.clone()))];
    let reporters: Vec<Arc<dyn ReportSink>> = vec![Arc::new(OneBotPrivateMessage::new(bot.clone()))];
    let log = MemberLog::new(data_path.join(&config.log_file));

    let scheduled = config.enabled && config.group_id != 0;
    let crawler = Arc::new(Crawler::new(config, sources, reporters, log, self_id));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    if scheduled {
        // 插件被禁用时 kovi 会中止该任务，卸载时另有关闭信号
        kovi::spawn(Arc::clone(&crawler).run(Arc::new(TokioTicker), shutdown_rx));
    } else {
        kovi::log::warn!("⚠️  未启用定时爬取或未配置群号，仅支持手动爬取");
    }
    kovi::log::info!("群成员爬取插件初始化完成");

    plugin::on_admin_msg(move |event| {
        let crawler = Arc::clone(&crawler);

        async move {
            let text = match event.borrow_text() {
                Some(t) => t.trim(),
                None => return,
            };

            let reply = match text.trim_start_matches('/') {
                "立即爬取" => match crawler.poll().await {
                    Ok(summary) => summary.render(),
                    Err(e) => format!("❌ {}", e),
                },
                "爬取状态" => crawler.status().render(),
                "清除缓存" => {
                    let cleared = crawler.clear_cache().await;
                    format!("🗑️ 已清除 {} 个已处理成员", cleared)
                }
                _ => return,
            };

            event.reply(&reply);
        }
    });

    plugin::drop(move || {
        let shutdown_tx = Arc::clone(&shutdown_tx);
        async move {
            let _ = shutdown_tx.send(true);
            kovi::log::info!("群成员爬取插件正在卸载...");
        }
    });
}
