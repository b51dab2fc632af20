//! 关机控制
//!
//! 循环进入 Stopping 后，端口所有权移交给 [`ShutdownController`]，
//! 由它发送唯一一次关机命令。失败不会向上传播，而是变成 [`StopOutcome::Failed`]。

use crate::port::ActuatorPort;
use std::fmt;
use tracing::{error, info};

/// 关机结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    Failed(String),
}

impl StopOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, StopOutcome::Stopped)
    }
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::Stopped => write!(f, "Motor Stopped Safely."),
            StopOutcome::Failed(reason) => write!(f, "Failed to shutdown motor: {}", reason),
        }
    }
}

/// 一次性关机控制器
///
/// `attempt_stop` 消耗自身和端口，同一次运行不可能发出第二次关机命令。
#[derive(Debug, Default)]
pub struct ShutdownController {
    _private: (),
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发送关机命令（不重试）
    pub fn attempt_stop<P: ActuatorPort>(self, mut port: P) -> StopOutcome {
        match port.stop() {
            Ok(()) => {
                info!("Motor output disabled");
                StopOutcome::Stopped
            },
            Err(e) => {
                error!("Shutdown command failed: {}", e);
                StopOutcome::Failed(e.to_string())
            },
        }
    }
}
