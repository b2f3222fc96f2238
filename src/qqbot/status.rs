use std::path::Path;
use sysinfo::{Disks, System};

const GB: u64 = 1024 * 1024 * 1024;

/// 服务器资源快照
#[derive(Debug, Clone, PartialEq)]
pub struct ServerStatus {
    pub cpu_percent: f32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
    pub uptime_secs: u64,
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 1000.0).round() / 10.0
}

impl ServerStatus {
    /// 采集当前状态，CPU 占用需要间隔采样
    pub async fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        sys.refresh_cpu();
        sys.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .or_else(|| disks.list().first());
        let (disk_total, disk_used) = root
            .map(|d| (d.total_space(), d.total_space().saturating_sub(d.available_space())))
            .unwrap_or((0, 0));

        Self {
            cpu_percent: sys.global_cpu_info().cpu_usage(),
            memory_used: sys.used_memory(),
            memory_total: sys.total_memory(),
            disk_used,
            disk_total,
            uptime_secs: System::uptime(),
        }
    }

    pub fn render(&self) -> String {
        let days = self.uptime_secs / 86_400;
        let hours = self.uptime_secs % 86_400 / 3600;
        let minutes = self.uptime_secs % 3600 / 60;

        format!(
            "🖥️ 服务器运行状态：\nCPU使用率：{:.1}%\n内存使用：{}% ({}GB / {}GB)\n磁盘使用：{}% ({}GB / {}GB)\n运行时间：{}天 {}小时 {}分钟",
            self.cpu_percent,
            percent(self.memory_used, self.memory_total),
            self.memory_used / GB,
            self.memory_total / GB,
            percent(self.disk_used, self.disk_total),
            self.disk_used / GB,
            self.disk_total / GB,
            days,
            hours,
            minutes,
        )
    }
}
