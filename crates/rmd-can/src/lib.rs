//! # RMD CAN Adapter Layer
//!
//! CAN 硬件抽象层，提供统一的 CAN 接口抽象。
//!
//! - Linux: [`SocketCanAdapter`]（内核 SocketCAN）
//! - `mock` feature: [`MockCanAdapter`]（模拟单个电机，无硬件依赖）

use std::time::Duration;
use thiserror::Error;

// 重新导出 rmd-protocol 中的 RmdFrame
pub use rmd_protocol::RmdFrame;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use socketcan::SocketCanAdapter;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MAX_RECENT_FRAMES, MockActuatorHandle, MockCanAdapter};

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] CanDeviceError),
    #[error("Read timeout")]
    Timeout,
    #[error("Bus off")]
    BusOff,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanDeviceErrorKind {
    Unknown,
    NotFound,
    NotUp,
    AccessDenied,
    InvalidFrame,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct CanDeviceError {
    pub kind: CanDeviceErrorKind,
    pub message: String,
}

impl CanDeviceError {
    pub fn new(kind: CanDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 重试无法恢复的错误（接口不存在、未启动、权限不足）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            CanDeviceErrorKind::NotFound
                | CanDeviceErrorKind::NotUp
                | CanDeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for CanDeviceError {
    fn from(message: String) -> Self {
        Self::new(CanDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for CanDeviceError {
    fn from(message: &str) -> Self {
        Self::new(CanDeviceErrorKind::Unknown, message)
    }
}

/// CAN 适配器统一接口
pub trait CanAdapter {
    /// 发送帧（Fire-and-Forget）
    fn send(&mut self, frame: RmdFrame) -> Result<(), CanError>;

    /// 接收帧（阻塞直到收到有效数据帧或超时）
    fn receive(&mut self) -> Result<RmdFrame, CanError>;

    fn set_receive_timeout(&mut self, _timeout: Duration) {}

    fn receive_timeout(&mut self, timeout: Duration) -> Result<RmdFrame, CanError> {
        self.set_receive_timeout(timeout);
        self.receive()
    }

    fn try_receive(&mut self) -> Result<Option<RmdFrame>, CanError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(frame) => Ok(Some(frame)),
            Err(CanError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<A: CanAdapter + ?Sized> CanAdapter for Box<A> {
    fn send(&mut self, frame: RmdFrame) -> Result<(), CanError> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> Result<RmdFrame, CanError> {
        (**self).receive()
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        (**self).set_receive_timeout(timeout)
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<RmdFrame, CanError> {
        (**self).receive_timeout(timeout)
    }

    fn try_receive(&mut self) -> Result<Option<RmdFrame>, CanError> {
        (**self).try_receive()
    }
}
