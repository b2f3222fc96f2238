pub mod qqbot;

use kovi::PluginBuilder as plugin;
use std::sync::Arc;
use crate::qqbot::{load_config, Command, QqBot};

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
            qqbot::Config::default()
        }
    };

    let qqbot = Arc::new(QqBot::new(&config, &data_path));
    qqbot.migrate_legacy_users().await;
    kovi::log::info!("QQBot插件初始化完成");

    plugin::on_msg(move |event| {
        let qqbot = Arc::clone(&qqbot);

        async move {
            let text = match event.borrow_text() {
                Some(t) => t,
                None => return,
            };

            let command = match Command::parse(text) {
                Some(c) => c,
                None => return,
            };

            let user_id = event.sender.user_id.to_string();
            let reply = qqbot.handle(&user_id, command).await;
            event.reply(&reply);
        }
    });

    plugin::drop(|| async {
        kovi::log::info!("QQBot插件正在卸载...");
    });
}
