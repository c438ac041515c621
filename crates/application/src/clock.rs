use domain::Timestamp;

/// 时间来源。服务通过它获取当前时间，测试中可替换为固定时钟。
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// 读取系统 UTC 时间
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}
