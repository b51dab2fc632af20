//! Sine Trajectory - 正弦参考轨迹
//!
//! ```text
//! ω = 2π·f
//! p(t) = A·sin(ωt)
//! v(t) = A·ω·cos(ωt)
//! ```
//!
//! 参考轨迹是时间的纯函数：同一个 `t` 总是得到同一个结果，
//! 可以从任意时刻重新开始。幅值单位由调用方决定（运控模式为弧度，
//! 绝对位置模式为角度），这里不做任何换算。
//!
//! # 示例
//!
//! ```rust
//! use rmd_client::control::{SineTrajectory, TrajectoryParams};
//!
//! let params = TrajectoryParams::new(45.0, 1.0).unwrap();
//! let trajectory = SineTrajectory::with_velocity(params);
//!
//! let r = trajectory.reference(0.25);
//! assert!((r.position - 45.0).abs() < 1e-9);
//! assert!(r.velocity.unwrap().abs() < 1e-9);
//! ```

use crate::error::ConfigError;
use std::f64::consts::TAU;

/// 正弦参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryParams {
    /// 幅值 A（> 0）
    pub amplitude: f64,
    /// 频率 f（Hz，> 0）
    pub frequency_hz: f64,
}

impl TrajectoryParams {
    pub fn new(amplitude: f64, frequency_hz: f64) -> Result<Self, ConfigError> {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "amplitude",
                expected: "> 0",
                value: amplitude,
            });
        }
        if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "frequency_hz",
                expected: "> 0",
                value: frequency_hz,
            });
        }
        Ok(Self {
            amplitude,
            frequency_hz,
        })
    }

    /// 角频率 ω = 2πf
    #[inline]
    pub fn omega(&self) -> f64 {
        TAU * self.frequency_hz
    }
}

/// 某一时刻的参考状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceState {
    pub position: f64,
    /// 仅运控模式提供
    pub velocity: Option<f64>,
}

/// 正弦轨迹发生器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineTrajectory {
    params: TrajectoryParams,
    with_velocity: bool,
}

impl SineTrajectory {
    /// 位置 + 速度（运控模式）
    pub fn with_velocity(params: TrajectoryParams) -> Self {
        Self {
            params,
            with_velocity: true,
        }
    }

    /// 仅位置（绝对位置模式）
    pub fn position_only(params: TrajectoryParams) -> Self {
        Self {
            params,
            with_velocity: false,
        }
    }

    pub fn params(&self) -> TrajectoryParams {
        self.params
    }

    /// 计算时刻 `t`（秒，自循环开始）的参考状态
    pub fn reference(&self, t: f64) -> ReferenceState {
        let omega = self.params.omega();
        let phase = omega * t;
        ReferenceState {
            position: self.params.amplitude * phase.sin(),
            velocity: self
                .with_velocity
                .then(|| self.params.amplitude * omega * phase.cos()),
        }
    }
}
