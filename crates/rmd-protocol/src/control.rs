//! 控制帧结构体定义
//!
//! 包含运控模式（0x400 + ID）以及单电机控制命令（0x140 + ID）的帧构建。

use crate::RmdFrame;
use crate::ids::*;

// ============================================================================
// 运控模式指令
// ============================================================================

/// 运控模式参数范围（固件固定值，不要更改）
pub const MOTION_P_MIN: f32 = -12.5;
pub const MOTION_P_MAX: f32 = 12.5;
pub const MOTION_V_MIN: f32 = -45.0;
pub const MOTION_V_MAX: f32 = 45.0;
pub const MOTION_KP_MIN: f32 = 0.0;
pub const MOTION_KP_MAX: f32 = 500.0;
pub const MOTION_KD_MIN: f32 = 0.0;
pub const MOTION_KD_MAX: f32 = 5.0;
pub const MOTION_T_MIN: f32 = -24.0;
pub const MOTION_T_MAX: f32 = 24.0;

/// 将浮点数钳位后映射为无符号整数
///
/// 公式：`(clamp(x) - x_min) * ((1 << bits) - 1) / (x_max - x_min)`
pub fn float_to_uint(x: f32, x_min: f32, x_max: f32, bits: u32) -> u32 {
    let span = x_max - x_min;
    if span <= 0.0 {
        return 0;
    }
    let max_int = (1u32 << bits) - 1;
    let clamped = x.clamp(x_min, x_max);
    let result = ((clamped - x_min) * max_int as f32 / span) as u32;
    result.min(max_int)
}

/// 将无符号整数映射回浮点数
///
/// 公式：`x_int * (x_max - x_min) / ((1 << bits) - 1) + x_min`
pub fn uint_to_float(x_int: u32, x_min: f32, x_max: f32, bits: u32) -> f32 {
    let span = x_max - x_min;
    (x_int as f32) * span / ((1u32 << bits) - 1) as f32 + x_min
}

/// 运控模式指令 (0x400 + ID)
///
/// 位置、速度、刚度、阻尼和前馈力矩合并为一帧，由电机固件完成 PD 计算：
/// `τ = kp·(p_des − p) + kd·(v_des − v) + t_ff`
///
/// 超出范围的参数在打包前被钳位。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionControlCommand {
    pub node_id: u8,
    /// 期望位置（rad），[-12.5, 12.5]
    pub p_des: f32,
    /// 期望速度（rad/s），[-45, 45]
    pub v_des: f32,
    /// 位置增益，[0, 500]
    pub kp: f32,
    /// 速度增益，[0, 5]
    pub kd: f32,
    /// 前馈力矩（N·m），[-24, 24]
    pub t_ff: f32,
}

impl MotionControlCommand {
    pub fn new(node_id: u8, p_des: f32, v_des: f32, kp: f32, kd: f32, t_ff: f32) -> Self {
        Self {
            node_id,
            p_des,
            v_des,
            kp,
            kd,
            t_ff,
        }
    }

    /// 转换为 CAN 帧
    ///
    /// 位域布局：
    /// - Byte 0-1: p_des (16 位，高字节在前)
    /// - Byte 2: v_des [bit11~bit4]
    /// - Byte 3: v_des [bit3~bit0] | kp [bit11~bit8]
    /// - Byte 4: kp [bit7~bit0]
    /// - Byte 5: kd [bit11~bit4]
    /// - Byte 6: kd [bit3~bit0] | t_ff [bit11~bit8]
    /// - Byte 7: t_ff [bit7~bit0]
    pub fn to_frame(self) -> RmdFrame {
        let p_int = float_to_uint(self.p_des, MOTION_P_MIN, MOTION_P_MAX, 16);
        let v_int = float_to_uint(self.v_des, MOTION_V_MIN, MOTION_V_MAX, 12);
        let kp_int = float_to_uint(self.kp, MOTION_KP_MIN, MOTION_KP_MAX, 12);
        let kd_int = float_to_uint(self.kd, MOTION_KD_MIN, MOTION_KD_MAX, 12);
        let t_int = float_to_uint(self.t_ff, MOTION_T_MIN, MOTION_T_MAX, 12);

        let mut data = [0u8; 8];
        data[0] = ((p_int >> 8) & 0xFF) as u8;
        data[1] = (p_int & 0xFF) as u8;
        data[2] = ((v_int >> 4) & 0xFF) as u8;
        data[3] = (((v_int & 0x0F) << 4) | ((kp_int >> 8) & 0x0F)) as u8;
        data[4] = (kp_int & 0xFF) as u8;
        data[5] = ((kd_int >> 4) & 0xFF) as u8;
        data[6] = (((kd_int & 0x0F) << 4) | ((t_int >> 8) & 0x0F)) as u8;
        data[7] = (t_int & 0xFF) as u8;

        RmdFrame::new_standard(motion_control_request_id(self.node_id) as u16, &data)
    }
}

// ============================================================================
// 单电机控制指令
// ============================================================================

/// 绝对位置闭环控制指令 (0xA4)
///
/// - Byte 2-3: 最大速度（u16，1 dps/LSB）
/// - Byte 4-7: 目标角度（i32，0.01 degree/LSB）
///
/// 电机内部位置环负责轨迹跟踪，速度受 `max_speed_dps` 限制。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsolutePositionCommand {
    pub node_id: u8,
    /// 目标角度（degree）
    pub angle_deg: f64,
    /// 最大速度（degree/s）
    pub max_speed_dps: f64,
}

impl AbsolutePositionCommand {
    pub fn new(node_id: u8, angle_deg: f64, max_speed_dps: f64) -> Self {
        Self {
            node_id,
            angle_deg,
            max_speed_dps,
        }
    }

    pub fn to_frame(self) -> RmdFrame {
        let speed = self.max_speed_dps.round().clamp(0.0, u16::MAX as f64) as u16;
        let angle = (self.angle_deg * 100.0)
            .round()
            .clamp(i32::MIN as f64, i32::MAX as f64) as i32;

        let mut data = [0u8; 8];
        data[0] = CMD_ABSOLUTE_POSITION;
        data[2..4].copy_from_slice(&speed.to_le_bytes());
        data[4..8].copy_from_slice(&angle.to_le_bytes());

        RmdFrame::new_standard(single_motor_request_id(self.node_id) as u16, &data)
    }
}

/// 电机关闭指令 (0x80)
///
/// 关闭电机输出并清除运行状态，电机回复相同命令字。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownMotorCommand {
    pub node_id: u8,
}

impl ShutdownMotorCommand {
    pub fn new(node_id: u8) -> Self {
        Self { node_id }
    }

    pub fn to_frame(self) -> RmdFrame {
        let mut data = [0u8; 8];
        data[0] = CMD_SHUTDOWN_MOTOR;
        RmdFrame::new_standard(single_motor_request_id(self.node_id) as u16, &data)
    }
}

/// 系统复位指令 (0x76)
///
/// 电机立即重启，不发送回复。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemResetCommand {
    pub node_id: u8,
}

impl SystemResetCommand {
    pub fn new(node_id: u8) -> Self {
        Self { node_id }
    }

    pub fn to_frame(self) -> RmdFrame {
        let mut data = [0u8; 8];
        data[0] = CMD_SYSTEM_RESET;
        RmdFrame::new_standard(single_motor_request_id(self.node_id) as u16, &data)
    }
}
