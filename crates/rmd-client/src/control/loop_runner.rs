//! 正弦跟踪控制循环
//!
//! 单线程、顺序执行。每个 tick：
//!
//! 1. `t = now - start`
//! 2. 计算参考状态
//! 3. 构建本模式的命令
//! 4. `ActuatorPort::send`（阻塞，超时由端口负责）
//! 5. 输出一行状态
//! 6. 睡眠到距本 tick 开始满一个周期；超时则不睡眠并记录 overrun
//!
//! 停止请求只在 tick 边界检查。观察到请求后不再发送任何轨迹命令，
//! 端口移交给 [`ShutdownController`]。
//!
//! # 示例
//!
//! ```rust,no_run
//! use rmd_client::config::RunConfig;
//! use rmd_client::control::{ControlLoop, SystemClock};
//! use rmd_client::port::SocketCanConnector;
//! use rmd_client::status::ConsoleSink;
//! use rmd_client::stop::StopToken;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::default();
//! let stop = StopToken::new();
//! let control = ControlLoop::new(&config, SystemClock::new(), ConsoleSink)?;
//! let report = control.run(&SocketCanConnector::default(), &stop)?;
//! println!("{} ticks, {} overruns", report.ticks, report.overruns);
//! # Ok(())
//! # }
//! ```

use crate::config::{ActuatorConfig, RunConfig};
use crate::control::{
    Clock, ControlProfile, ShutdownController, SineTrajectory, StopOutcome, TrajectoryParams,
};
use crate::error::{ConfigError, RunError};
use crate::port::{ActuatorPort, Connector};
use crate::state::{LoopState, StateTracker};
use crate::status::{StatusEvent, StatusLine, StatusSink};
use crate::stop::StopToken;
use crate::types::Rad;
use std::time::Duration;
use tracing::{error, info, trace, warn};

/// 循环节奏设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// 两个 tick 起点之间的目标间隔
    pub period: Duration,
    /// 命令失败后是否先尝试一次关机再进入 Faulted
    pub stop_on_command_error: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(10),
            stop_on_command_error: true,
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Stopped 或 Faulted
    pub final_state: LoopState,
    /// 经历过的状态序列
    pub states: Vec<LoopState>,
    /// 成功完成的 tick 数
    pub ticks: u64,
    /// 超过周期的 tick 数
    pub overruns: u64,
    /// 关机结果（未尝试关机时为 `None`）
    pub stop_outcome: Option<StopOutcome>,
}

/// 控制循环
pub struct ControlLoop<C: Clock, S: StatusSink> {
    actuator: ActuatorConfig,
    trajectory: SineTrajectory,
    /// 启动横幅中显示的幅值（°）
    amplitude_deg: f64,
    profile: ControlProfile,
    settings: LoopSettings,
    clock: C,
    sink: S,
    state: StateTracker,
    ticks: u64,
    overruns: u64,
}

impl<C: Clock, S: StatusSink> ControlLoop<C, S> {
    /// 从运行配置构建（先校验）
    pub fn new(config: &RunConfig, clock: C, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut control = Self::from_parts(
            config.actuator.clone(),
            config.trajectory_params()?,
            config.control_profile(),
            config.loop_settings(),
            clock,
            sink,
        );
        // 用配置值而不是 rad -> deg 的回转结果
        control.amplitude_deg = config.trajectory.amplitude_deg;
        Ok(control)
    }

    /// 直接由各部分构建
    ///
    /// 运控模式生成位置 + 速度，绝对位置模式只生成位置。
    pub fn from_parts(
        actuator: ActuatorConfig,
        params: TrajectoryParams,
        profile: ControlProfile,
        settings: LoopSettings,
        clock: C,
        sink: S,
    ) -> Self {
        let (trajectory, amplitude_deg) = if profile.needs_velocity() {
            (
                SineTrajectory::with_velocity(params),
                Rad(params.amplitude).to_deg().0,
            )
        } else {
            (SineTrajectory::position_only(params), params.amplitude)
        };
        Self {
            actuator,
            trajectory,
            amplitude_deg,
            profile,
            settings,
            clock,
            sink,
            state: StateTracker::new(),
            ticks: 0,
            overruns: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.current()
    }

    /// 连接执行器并运行到停止或故障
    pub fn run<K: Connector>(mut self, connector: &K, stop: &StopToken) -> Result<RunReport, RunError> {
        let port = match connector.connect(&self.actuator) {
            Ok(port) => port,
            Err(e) => {
                error!("{}", e);
                self.enter(LoopState::Faulted);
                return Err(e.into());
            },
        };
        self.run_with_port(port, stop)
    }

    /// 在已建立的端口上运行
    pub fn run_with_port<P: ActuatorPort>(mut self, mut port: P, stop: &StopToken) -> Result<RunReport, RunError> {
        self.enter(LoopState::Connected);
        info!(
            "Connected to motor {} on {}",
            self.actuator.node_id, self.actuator.interface
        );
        self.sink.emit(StatusEvent::Connected {
            node_id: self.actuator.node_id,
            interface: self.actuator.interface.clone(),
        });

        self.sink.emit(StatusEvent::Starting {
            amplitude_deg: self.amplitude_deg,
            frequency_hz: self.trajectory.params().frequency_hz,
        });

        self.enter(LoopState::Running);
        let period = self.settings.period;
        let start = self.clock.elapsed();
        info!("Control loop running, period {:?}", period);

        while !stop.is_stop_requested() {
            let tick_start = self.clock.elapsed();
            let t = tick_start.saturating_sub(start).as_secs_f64();

            let reference = self.trajectory.reference(t);
            let command = self.profile.command(&reference);
            trace!("t={:.3}s command={:?}", t, command);

            let measured = match port.send(&command) {
                Ok(measured) => measured,
                Err(e) => {
                    error!("Command failed at t={:.3}s: {}", t, e);
                    let stop_outcome = if self.settings.stop_on_command_error {
                        self.enter(LoopState::Stopping);
                        Some(self.shutdown(port))
                    } else {
                        None
                    };
                    self.enter(LoopState::Faulted);
                    return Err(RunError::Command {
                        source: e,
                        report: self.report(stop_outcome),
                    });
                },
            };
            self.ticks += 1;
            self.sink.emit(StatusEvent::Tick(StatusLine::new(
                &self.profile,
                &reference,
                &measured,
            )));

            let spent = self.clock.elapsed().saturating_sub(tick_start);
            if spent < period {
                self.clock.sleep(period - spent);
            } else if spent > period {
                self.overruns += 1;
                warn!(
                    "Control loop overrun: tick took {:?} (period {:?}). Skipping sleep.",
                    spent, period
                );
            }
        }

        info!("Stop requested after {} ticks", self.ticks);
        self.sink.emit(StatusEvent::StopRequested);
        self.enter(LoopState::Stopping);
        let outcome = self.shutdown(port);
        let terminal = if outcome.is_stopped() {
            LoopState::Stopped
        } else {
            LoopState::Faulted
        };
        self.enter(terminal);
        Ok(self.report(Some(outcome)))
    }

    /// 端口所有权移交关机控制器
    fn shutdown<P: ActuatorPort>(&mut self, port: P) -> StopOutcome {
        let outcome = ShutdownController::new().attempt_stop(port);
        self.sink.emit(StatusEvent::StopOutcome(outcome.clone()));
        outcome
    }

    fn enter(&mut self, next: LoopState) {
        if let Err(e) = self.state.transition(next) {
            error!("{}", e);
        }
    }

    fn report(&self, stop_outcome: Option<StopOutcome>) -> RunReport {
        RunReport {
            final_state: self.state.current(),
            states: self.state.history().to_vec(),
            ticks: self.ticks,
            overruns: self.overruns,
            stop_outcome,
        }
    }
}
