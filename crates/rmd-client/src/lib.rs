//! RMD 单电机正弦跟踪控制
//!
//! 本 crate 实时生成正弦参考轨迹，以固定周期（默认 10 ms）发送给一台
//! MyActuator RMD 电机，并逐 tick 输出测量状态。Ctrl+C 通过 [`StopToken`]
//! 协作式地结束循环，随后只发送一次关机命令。
//!
//! # 模块
//!
//! - [`config`]: 运行配置（TOML，serde）
//! - [`control`]: 轨迹、命令、控制循环、关机
//! - [`port`]: 执行器端口与连接器
//! - [`state`]: 循环状态机
//! - [`status`]: 控制台输出
//! - [`types`]: 角度单位
//!
//! 帧级协议见 `rmd-protocol`，总线访问见 `rmd-can`，请求/应答驱动见 `rmd-driver`。

pub mod config;
pub mod control;
pub mod error;
pub mod port;
pub mod state;
pub mod status;
pub mod stop;
pub mod types;

pub use config::{ActuatorConfig, ControlMode, RunConfig};
pub use control::{
    Command, ControlLoop, MeasuredState, RunReport, ShutdownController, StopOutcome, SystemClock,
};
pub use error::{CommandError, ConfigError, ConnectionError, RunError, StopError};
#[cfg(feature = "mock")]
pub use port::MockConnector;
pub use port::{ActuatorPort, Connector, RmdPort, SocketCanConnector};
pub use state::LoopState;
pub use status::{ConsoleSink, StatusEvent, StatusSink};
pub use stop::StopToken;
pub use types::{Deg, Rad};
