//! 停止请求令牌
//!
//! Ctrl+C 处理函数在另一个线程中调用 [`StopToken::request_stop`]，
//! 控制循环在每个 tick 边界检查 [`StopToken::is_stop_requested`]。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct StopToken {
    requested: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止（可重复调用，幂等）
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = StopToken::new();
        let handler_side = token.clone();
        assert!(!token.is_stop_requested());

        std::thread::spawn(move || handler_side.request_stop())
            .join()
            .unwrap();
        assert!(token.is_stop_requested());

        token.request_stop();
        assert!(token.is_stop_requested());
    }
}
