//! 控制台状态输出
//!
//! 控制循环把连接、启动、每个 tick 的状态行以及关机结果作为 [`StatusEvent`]
//! 交给 [`StatusSink`]。[`ConsoleSink`] 逐行打印到 stdout（不经过日志）。

use crate::control::{ControlProfile, Effort, MeasuredState, ReferenceState, StopOutcome};
use crate::types::Rad;
use std::fmt;

/// 单个 tick 的状态行（全部以角度显示）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLine {
    Impedance {
        target_deg: f64,
        target_vel_dps: f64,
        actual_deg: f64,
        actual_vel_dps: f64,
        torque_nm: f64,
    },
    AbsolutePosition {
        target_deg: f64,
        actual_deg: f64,
        actual_vel_dps: f64,
        current_a: f64,
    },
}

impl StatusLine {
    pub fn new(profile: &ControlProfile, reference: &ReferenceState, measured: &MeasuredState) -> Self {
        let effort = match measured.effort {
            Effort::Torque(v) | Effort::Current(v) => v,
        };
        match profile {
            // 运控模式内部使用弧度
            ControlProfile::Impedance(_) => StatusLine::Impedance {
                target_deg: Rad(reference.position).to_deg().0,
                target_vel_dps: Rad(reference.velocity.unwrap_or(0.0)).to_deg().0,
                actual_deg: Rad(measured.shaft_angle).to_deg().0,
                actual_vel_dps: Rad(measured.shaft_speed).to_deg().0,
                torque_nm: effort,
            },
            ControlProfile::AbsolutePosition { .. } => StatusLine::AbsolutePosition {
                target_deg: reference.position,
                actual_deg: measured.shaft_angle,
                actual_vel_dps: measured.shaft_speed,
                current_a: effort,
            },
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StatusLine::Impedance {
                target_deg,
                target_vel_dps,
                actual_deg,
                actual_vel_dps,
                torque_nm,
            } => write!(
                f,
                "Target: {:6.2} deg | Target Vel: {:6.2} deg/s | Actual: {:6.2} deg | Actual Vel: {:6.2} deg/s | Torque: {:6.2} Nm",
                target_deg, target_vel_dps, actual_deg, actual_vel_dps, torque_nm
            ),
            StatusLine::AbsolutePosition {
                target_deg,
                actual_deg,
                actual_vel_dps,
                current_a,
            } => write!(
                f,
                "Target: {:6.2} deg | Actual: {:6.2} deg | Actual Vel: {:6.2} deg/s | Current: {:6.2} A",
                target_deg, actual_deg, actual_vel_dps, current_a
            ),
        }
    }
}

/// 控制循环对外输出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Connected { node_id: u8, interface: String },
    Starting { amplitude_deg: f64, frequency_hz: f64 },
    Tick(StatusLine),
    StopRequested,
    StopOutcome(StopOutcome),
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Connected { node_id, interface } => {
                write!(f, "Connected to Motor {} on {}", node_id, interface)
            },
            StatusEvent::Starting {
                amplitude_deg,
                frequency_hz,
            } => write!(
                f,
                "Starting Sine Wave: Amp={} deg, Freq={} Hz\nPress Ctrl+C to stop.",
                amplitude_deg, frequency_hz
            ),
            StatusEvent::Tick(line) => write!(f, "{}", line),
            StatusEvent::StopRequested => write!(f, "\n[!] Ctrl+C Detected. Stopping Motor..."),
            StatusEvent::StopOutcome(outcome) => write!(f, "{}", outcome),
        }
    }
}

/// 状态事件接收端
pub trait StatusSink {
    fn emit(&mut self, event: StatusEvent);
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn emit(&mut self, event: StatusEvent) {
        (**self).emit(event)
    }
}

/// 收集事件（测试与离线分析）
impl StatusSink for Vec<StatusEvent> {
    fn emit(&mut self, event: StatusEvent) {
        self.push(event);
    }
}

/// 打印到 stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn emit(&mut self, event: StatusEvent) {
        println!("{}", event);
    }
}
