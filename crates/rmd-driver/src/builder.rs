//! Builder 模式实现
//!
//! 提供链式构造 `ActuatorInterface` 实例的便捷方式。

use crate::actuator::{ActuatorInterface, DEFAULT_REPLY_TIMEOUT};
use crate::error::DriverError;
use rmd_can::CanAdapter;
use std::time::Duration;

/// 默认 CAN 接口
pub const DEFAULT_INTERFACE: &str = "can0";

/// Actuator Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use rmd_driver::ActuatorBuilder;
/// use std::time::Duration;
///
/// let actuator = ActuatorBuilder::new()
///     .interface("can2")
///     .node_id(1)
///     .reply_timeout(Duration::from_millis(20))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ActuatorBuilder {
    /// SocketCAN 接口名称（如 "can0"）
    interface: Option<String>,
    node_id: u8,
    reply_timeout: Duration,
}

impl ActuatorBuilder {
    pub fn new() -> Self {
        Self {
            interface: None,
            node_id: 1,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// 设置 CAN 接口（可选，默认 "can0"）
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// 设置节点 ID（可选，默认 1）
    pub fn node_id(mut self, node_id: u8) -> Self {
        self.node_id = node_id;
        self
    }

    /// 设置回复超时（可选，默认 50 ms）
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// 接口名称（未设置时为默认值）
    pub fn interface_name(&self) -> &str {
        self.interface.as_deref().unwrap_or(DEFAULT_INTERFACE)
    }

    /// 使用给定适配器构建（测试和 mock 模式）
    pub fn build_with<A: CanAdapter>(self, can: A) -> Result<ActuatorInterface<A>, DriverError> {
        Ok(ActuatorInterface::new(can, self.node_id)?.with_reply_timeout(self.reply_timeout))
    }

    /// 打开 SocketCAN 接口并构建
    ///
    /// # Errors
    /// - `DriverError::InvalidNodeId`: 节点 ID 不在 1~32
    /// - `DriverError::Can`: CAN 接口不存在、未启动或无法打开
    #[cfg(target_os = "linux")]
    pub fn build(self) -> Result<ActuatorInterface<rmd_can::SocketCanAdapter>, DriverError> {
        if !rmd_protocol::is_valid_node_id(self.node_id) {
            return Err(DriverError::InvalidNodeId(self.node_id));
        }
        let interface = self.interface_name().to_string();
        let can = rmd_can::SocketCanAdapter::new(&interface)?;
        tracing::info!("Opened SocketCAN interface '{}' for motor {}", interface, self.node_id);
        self.build_with(can)
    }

    /// SocketCAN 只在 Linux 上可用
    #[cfg(not(target_os = "linux"))]
    pub fn build(self) -> Result<ActuatorInterface<Box<dyn CanAdapter + Send>>, DriverError> {
        let err = rmd_can::CanDeviceError::new(
            rmd_can::CanDeviceErrorKind::Backend,
            format!(
                "SocketCAN interface '{}' is only available on Linux",
                self.interface_name()
            ),
        );
        Err(DriverError::Can(err.into()))
    }
}

impl Default for ActuatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
