//! 单调时钟抽象
//!
//! 控制循环只通过 [`Clock`] 读取时间和睡眠，测试可以用假时钟替换。

use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};

pub trait Clock {
    /// 自时钟创建以来经过的时间（单调不减）
    fn elapsed(&self) -> Duration;

    /// 睡眠指定时长
    fn sleep(&mut self, duration: Duration);
}

/// 系统单调时钟，使用 `spin_sleep` 获得亚毫秒级睡眠精度
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    sleeper: SpinSleeper,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sleeper: SpinSleeper::default(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeper.sleep(duration);
    }
}
