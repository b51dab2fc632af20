//! 控制模块
//!
//! - [`trajectory`]: 正弦参考轨迹
//! - [`command`]: 每个 tick 的命令与测量状态
//! - [`loop_runner`]: 固定周期控制循环
//! - [`shutdown`]: 一次性关机
//! - [`clock`]: 可替换的单调时钟

pub mod clock;
pub mod command;
pub mod loop_runner;
pub mod shutdown;
pub mod trajectory;

pub use clock::{Clock, SystemClock};
pub use command::{Command, ControlGains, ControlProfile, Effort, MeasuredState};
pub use loop_runner::{ControlLoop, LoopSettings, RunReport};
pub use shutdown::{ShutdownController, StopOutcome};
pub use trajectory::{ReferenceState, SineTrajectory, TrajectoryParams};
