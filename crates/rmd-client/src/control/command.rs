//! 每个 tick 发送的命令与返回的测量状态

use crate::control::ReferenceState;

/// 运控模式增益（一次运行内不变）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlGains {
    pub kp: f64,
    pub kd: f64,
    /// 前馈力矩（N·m）
    pub feedforward_torque: f64,
}

/// 执行器命令
///
/// 单位随模式而定：`Impedance` 为 rad / rad/s / N·m，
/// `AbsolutePosition` 为 degree / degree/s。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Impedance {
        position: f64,
        velocity: f64,
        kp: f64,
        kd: f64,
        feedforward_torque: f64,
    },
    AbsolutePosition {
        position: f64,
        max_speed: f64,
    },
}

/// 力矩或电流（取决于模式）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effort {
    /// 输出力矩（N·m）
    Torque(f64),
    /// 转矩电流（A）
    Current(f64),
}

/// 一次往返完成时刻的执行器状态
///
/// 单位与发出的 [`Command`] 一致。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredState {
    pub shaft_angle: f64,
    pub shaft_speed: f64,
    pub effort: Effort,
}

/// 命令构建方式（运行开始前确定）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlProfile {
    Impedance(ControlGains),
    /// `max_speed` 单位 degree/s
    AbsolutePosition { max_speed: f64 },
}

impl ControlProfile {
    /// 由参考状态构建本 tick 的命令
    pub fn command(&self, reference: &ReferenceState) -> Command {
        match *self {
            ControlProfile::Impedance(gains) => Command::Impedance {
                position: reference.position,
                velocity: reference.velocity.unwrap_or(0.0),
                kp: gains.kp,
                kd: gains.kd,
                feedforward_torque: gains.feedforward_torque,
            },
            ControlProfile::AbsolutePosition { max_speed } => Command::AbsolutePosition {
                position: reference.position,
                max_speed,
            },
        }
    }

    /// 运控模式需要参考速度
    pub fn needs_velocity(&self) -> bool {
        matches!(self, ControlProfile::Impedance(_))
    }
}
