//! 驱动层模块
//!
//! 本模块提供单个 RMD 电机的阻塞式请求/回复驱动，包括：
//! - 运控模式与绝对位置控制
//! - 电机关闭与系统复位
//! - 控制器增益读写、功能控制、CAN ID 修改
//!
//! 每个操作发送一帧并等待对应节点的回复；不匹配的回复（其他节点、
//! 其他命令字）被跳过，直到回复超时。

mod actuator;
mod builder;
mod error;

pub use actuator::{ActuatorInterface, DEFAULT_REPLY_TIMEOUT};
pub use builder::ActuatorBuilder;
pub use error::DriverError;

pub use rmd_protocol::{FunctionControlFeedback, FunctionControlType, GainType};
pub use rmd_protocol::{MotionControlFeedback, MotorStatus2};
