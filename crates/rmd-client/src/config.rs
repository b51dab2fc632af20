//! 运行配置
//!
//! 一次运行的全部参数，构造后不可变，显式传入控制循环。
//! 所有字段都有默认值（X6-60 电机，`can2` 上的 1 号节点，45°/1 Hz 正弦）。
//!
//! ```toml
//! mode = "impedance"          # 或 "absolute_position"
//!
//! [actuator]
//! interface = "can2"
//! node_id = 1
//!
//! [trajectory]
//! amplitude_deg = 45.0
//! frequency_hz = 1.0
//!
//! [gains]
//! kp = 15.0
//! kd = 1.0
//! feedforward_torque = 0.0
//!
//! [position]
//! rated_speed_rpm = 190.0
//! speed_multiplier = 6.0
//!
//! [loop]
//! period_ms = 10
//! stop_on_command_error = true
//! ```

use crate::control::{ControlGains, ControlProfile, LoopSettings, TrajectoryParams};
use crate::error::ConfigError;
use crate::types::Deg;
use rmd_protocol::{
    MOTION_KD_MAX, MOTION_KP_MAX, MOTION_P_MAX, MOTION_T_MAX, MOTION_V_MAX, is_valid_node_id,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::time::Duration;

/// 控制模式（运行开始前确定一次）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// 运控模式：位置 + 速度 + 刚度/阻尼/前馈，单位弧度
    #[default]
    Impedance,
    /// 绝对位置闭环：位置 + 最大速度，单位角度
    AbsolutePosition,
}

/// 执行器地址
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActuatorConfig {
    /// CAN 接口名称
    pub interface: String,
    /// 节点 ID（1~32）
    pub node_id: u8,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            interface: "can2".to_string(),
            node_id: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrajectoryConfig {
    /// 正弦幅值（degree）
    pub amplitude_deg: f64,
    pub frequency_hz: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            amplitude_deg: 45.0,
            frequency_hz: 1.0,
        }
    }
}

/// 运控模式增益（绝对位置模式忽略）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainsConfig {
    pub kp: f64,
    pub kd: f64,
    /// 前馈力矩（N·m）
    pub feedforward_torque: f64,
}

impl Default for GainsConfig {
    fn default() -> Self {
        Self {
            kp: 15.0,
            kd: 1.0,
            feedforward_torque: 0.0,
        }
    }
}

/// 绝对位置模式参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionConfig {
    /// 电机额定转速（rpm），X6-60 为 190
    pub rated_speed_rpm: f64,
    /// 最大速度 = 额定转速 × 倍率（rpm × 6 = degree/s）
    pub speed_multiplier: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            rated_speed_rpm: 190.0,
            speed_multiplier: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    /// 控制周期（ms）
    pub period_ms: u64,
    /// 命令失败后是否尝试一次关机
    pub stop_on_command_error: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period_ms: 10,
            stop_on_command_error: true,
        }
    }
}

/// 一次运行的完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub mode: ControlMode,
    pub actuator: ActuatorConfig,
    pub trajectory: TrajectoryConfig,
    pub gains: GainsConfig,
    pub position: PositionConfig,
    #[serde(rename = "loop")]
    pub control_loop: LoopConfig,
}

fn require(
    ok: bool,
    field: &'static str,
    expected: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

impl RunConfig {
    /// 校验全部字段
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actuator.interface.trim().is_empty() {
            return Err(ConfigError::EmptyInterface);
        }
        if !is_valid_node_id(self.actuator.node_id) {
            return Err(ConfigError::InvalidNodeId(self.actuator.node_id));
        }

        let t = &self.trajectory;
        require(
            t.amplitude_deg.is_finite() && t.amplitude_deg > 0.0,
            "trajectory.amplitude_deg",
            "> 0",
            t.amplitude_deg,
        )?;
        require(
            t.frequency_hz.is_finite() && t.frequency_hz > 0.0,
            "trajectory.frequency_hz",
            "> 0",
            t.frequency_hz,
        )?;

        match self.mode {
            ControlMode::Impedance => {
                let g = &self.gains;
                // 超出运控帧编码范围的值会被静默钳位，这里直接拒绝
                require(
                    Deg(t.amplitude_deg).to_rad().0 <= MOTION_P_MAX as f64,
                    "trajectory.amplitude_deg",
                    "<= 716.2 in impedance mode",
                    t.amplitude_deg,
                )?;
                // 峰值参考速度 A·2πf
                require(
                    Deg(t.amplitude_deg).to_rad().0 * TAU * t.frequency_hz
                        <= MOTION_V_MAX as f64,
                    "trajectory.frequency_hz",
                    "amplitude(rad) * 2pi * f <= 45 rad/s in impedance mode",
                    t.frequency_hz,
                )?;
                require(
                    (0.0..=MOTION_KP_MAX as f64).contains(&g.kp),
                    "gains.kp",
                    "within [0, 500]",
                    g.kp,
                )?;
                require(
                    (0.0..=MOTION_KD_MAX as f64).contains(&g.kd),
                    "gains.kd",
                    "within [0, 5]",
                    g.kd,
                )?;
                require(
                    g.feedforward_torque.abs() <= MOTION_T_MAX as f64,
                    "gains.feedforward_torque",
                    "within [-24, 24]",
                    g.feedforward_torque,
                )?;
            },
            ControlMode::AbsolutePosition => {
                let p = &self.position;
                require(
                    p.rated_speed_rpm.is_finite() && p.rated_speed_rpm > 0.0,
                    "position.rated_speed_rpm",
                    "> 0",
                    p.rated_speed_rpm,
                )?;
                require(
                    p.speed_multiplier.is_finite() && p.speed_multiplier > 0.0,
                    "position.speed_multiplier",
                    "> 0",
                    p.speed_multiplier,
                )?;
            },
        }

        if self.control_loop.period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(())
    }

    /// 轨迹参数（运控模式下幅值换算为弧度，绝对位置模式保持角度）
    pub fn trajectory_params(&self) -> Result<TrajectoryParams, ConfigError> {
        let amplitude = match self.mode {
            ControlMode::Impedance => Deg(self.trajectory.amplitude_deg).to_rad().0,
            ControlMode::AbsolutePosition => self.trajectory.amplitude_deg,
        };
        TrajectoryParams::new(amplitude, self.trajectory.frequency_hz)
    }

    /// 绝对位置模式最大速度（degree/s）
    pub fn max_speed_dps(&self) -> f64 {
        self.position.rated_speed_rpm * self.position.speed_multiplier
    }

    /// 每个 tick 的命令构建方式
    pub fn control_profile(&self) -> ControlProfile {
        match self.mode {
            ControlMode::Impedance => ControlProfile::Impedance(ControlGains {
                kp: self.gains.kp,
                kd: self.gains.kd,
                feedforward_torque: self.gains.feedforward_torque,
            }),
            ControlMode::AbsolutePosition => ControlProfile::AbsolutePosition {
                max_speed: self.max_speed_dps(),
            },
        }
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            period: Duration::from_millis(self.control_loop.period_ms),
            stop_on_command_error: self.control_loop.stop_on_command_error,
        }
    }
}
