//! 执行器端口
//!
//! [`ActuatorPort`] 是控制循环与电机之间唯一的接缝：发送一条命令并返回测量状态，
//! 或者发送关机命令。[`Connector`] 负责按 (interface, node id) 建立端口。
//!
//! [`RmdPort`] 是基于 `rmd-driver` 的实现，[`SocketCanConnector`] 打开 SocketCAN，
//! `MockConnector`（`mock` feature）使用帧级模拟电机。

use crate::config::ActuatorConfig;
use crate::control::{Command, Effort, MeasuredState};
use crate::error::{CommandError, ConnectionError, StopError};
use rmd_can::CanAdapter;
use rmd_driver::ActuatorInterface;
use std::time::Duration;
use tracing::trace;

/// 执行器端口
pub trait ActuatorPort {
    /// 发送一条命令并阻塞等待测量状态（超时由端口负责）
    fn send(&mut self, command: &Command) -> Result<MeasuredState, CommandError>;

    /// 关闭电机输出
    fn stop(&mut self) -> Result<(), StopError>;
}

impl<P: ActuatorPort + ?Sized> ActuatorPort for Box<P> {
    fn send(&mut self, command: &Command) -> Result<MeasuredState, CommandError> {
        (**self).send(command)
    }

    fn stop(&mut self) -> Result<(), StopError> {
        (**self).stop()
    }
}

impl<P: ActuatorPort + ?Sized> ActuatorPort for &mut P {
    fn send(&mut self, command: &Command) -> Result<MeasuredState, CommandError> {
        (**self).send(command)
    }

    fn stop(&mut self) -> Result<(), StopError> {
        (**self).stop()
    }
}

/// 端口工厂
pub trait Connector {
    type Port: ActuatorPort;

    fn connect(&self, actuator: &ActuatorConfig) -> Result<Self::Port, ConnectionError>;
}

/// 基于 RMD 驱动的端口
#[derive(Debug)]
pub struct RmdPort<A: CanAdapter> {
    actuator: ActuatorInterface<A>,
}

impl<A: CanAdapter> RmdPort<A> {
    pub fn new(actuator: ActuatorInterface<A>) -> Self {
        Self { actuator }
    }

    /// 底层驱动（增益读写、功能控制等参数操作）
    pub fn actuator_mut(&mut self) -> &mut ActuatorInterface<A> {
        &mut self.actuator
    }
}

impl<A: CanAdapter> ActuatorPort for RmdPort<A> {
    fn send(&mut self, command: &Command) -> Result<MeasuredState, CommandError> {
        match *command {
            Command::Impedance {
                position,
                velocity,
                kp,
                kd,
                feedforward_torque,
            } => {
                let fb = self.actuator.motion_control(
                    position as f32,
                    velocity as f32,
                    kp as f32,
                    kd as f32,
                    feedforward_torque as f32,
                )?;
                if fb.echo_node_id != self.actuator.node_id() {
                    trace!(
                        "Motion reply echoes node {} (expected {})",
                        fb.echo_node_id,
                        self.actuator.node_id()
                    );
                }
                Ok(MeasuredState {
                    shaft_angle: fb.position as f64,
                    shaft_speed: fb.velocity as f64,
                    effort: Effort::Torque(fb.torque as f64),
                })
            },
            Command::AbsolutePosition {
                position,
                max_speed,
            } => {
                let status = self
                    .actuator
                    .send_position_absolute_setpoint(position, max_speed)?;
                Ok(MeasuredState {
                    shaft_angle: status.shaft_angle,
                    shaft_speed: status.shaft_speed,
                    effort: Effort::Current(status.current),
                })
            },
        }
    }

    fn stop(&mut self) -> Result<(), StopError> {
        Ok(self.actuator.shutdown_motor()?)
    }
}

/// SocketCAN 连接器
#[derive(Debug, Clone, Default)]
pub struct SocketCanConnector {
    /// 覆盖驱动默认的回复超时
    pub reply_timeout: Option<Duration>,
}

#[cfg(target_os = "linux")]
impl Connector for SocketCanConnector {
    type Port = RmdPort<rmd_can::SocketCanAdapter>;

    fn connect(&self, actuator: &ActuatorConfig) -> Result<Self::Port, ConnectionError> {
        let mut builder = rmd_driver::ActuatorBuilder::new()
            .interface(actuator.interface.clone())
            .node_id(actuator.node_id);
        if let Some(timeout) = self.reply_timeout {
            builder = builder.reply_timeout(timeout);
        }
        builder
            .build()
            .map(RmdPort::new)
            .map_err(|source| ConnectionError {
                interface: actuator.interface.clone(),
                node_id: actuator.node_id,
                source,
            })
    }
}

/// 模拟电机连接器
///
/// 每次 `connect` 都创建一个新的模拟电机，节点 ID 取自配置。
#[cfg(feature = "mock")]
#[derive(Debug, Clone, Default)]
pub struct MockConnector;

#[cfg(feature = "mock")]
impl Connector for MockConnector {
    type Port = RmdPort<rmd_can::MockCanAdapter>;

    fn connect(&self, actuator: &ActuatorConfig) -> Result<Self::Port, ConnectionError> {
        let can = rmd_can::MockCanAdapter::new(actuator.node_id);
        ActuatorInterface::new(can, actuator.node_id)
            .map(RmdPort::new)
            .map_err(|source| ConnectionError {
                interface: actuator.interface.clone(),
                node_id: actuator.node_id,
                source,
            })
    }
}
