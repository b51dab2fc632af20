//! 回复帧结构体定义
//!
//! 运控模式回复（0x500 + ID）以及单电机命令回复（0x240 + ID）的解析。

use crate::RmdFrame;
use crate::control::{MOTION_P_MAX, MOTION_P_MIN, MOTION_T_MAX, MOTION_T_MIN};
use crate::control::{MOTION_V_MAX, MOTION_V_MIN, uint_to_float};
use crate::ids::*;
use crate::{ProtocolError, bytes_to_i16_le};

/// 从回复帧 ID 推导节点 ID
pub(crate) fn node_id_from(frame: &RmdFrame, base: u32) -> Result<u8, ProtocolError> {
    let node = frame.id.wrapping_sub(base);
    if frame.id <= base || node > MAX_NODE_ID as u32 {
        return Err(ProtocolError::InvalidCanId { id: frame.id });
    }
    Ok(node as u8)
}

/// 校验回复命令字
pub(crate) fn expect_command(frame: &RmdFrame, expected: u8) -> Result<(), ProtocolError> {
    let actual = frame.data[0];
    if actual != expected {
        return Err(ProtocolError::UnexpectedCommand { expected, actual });
    }
    Ok(())
}

// ============================================================================
// 运控模式回复
// ============================================================================

/// 运控模式回复 (0x500 + ID)
///
/// - Byte 0: 节点 ID 回显
/// - Byte 1-2: 当前位置（16 位，±12.5 rad）
/// - Byte 3, Byte 4[7:4]: 当前速度（12 位，±45 rad/s）
/// - Byte 4[3:0], Byte 5: 当前力矩（12 位，±24 N·m）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionControlFeedback {
    /// 回复帧 ID 推导出的节点 ID
    pub node_id: u8,
    /// Byte 0 回显的节点 ID
    pub echo_node_id: u8,
    /// 输出轴角度（rad）
    pub position: f32,
    /// 输出轴速度（rad/s）
    pub velocity: f32,
    /// 输出力矩（N·m）
    pub torque: f32,
}

impl TryFrom<RmdFrame> for MotionControlFeedback {
    type Error = ProtocolError;

    fn try_from(frame: RmdFrame) -> Result<Self, Self::Error> {
        let node_id = node_id_from(&frame, MOTION_CONTROL_REPLY_BASE)?;
        frame.require_full()?;

        let d = frame.data;
        let p_raw = ((d[1] as u32) << 8) | d[2] as u32;
        let v_raw = ((d[3] as u32) << 4) | (d[4] >> 4) as u32;
        let t_raw = (((d[4] & 0x0F) as u32) << 8) | d[5] as u32;

        Ok(Self {
            node_id,
            echo_node_id: d[0],
            position: uint_to_float(p_raw, MOTION_P_MIN, MOTION_P_MAX, 16),
            velocity: uint_to_float(v_raw, MOTION_V_MIN, MOTION_V_MAX, 12),
            torque: uint_to_float(t_raw, MOTION_T_MIN, MOTION_T_MAX, 12),
        })
    }
}

// ============================================================================
// 单电机命令回复
// ============================================================================

/// 电机状态 2（0xA4 等闭环控制命令的回复）
///
/// - Byte 1: 电机温度（i8，1 ℃/LSB）
/// - Byte 2-3: 转矩电流 iq（i16，0.01 A/LSB）
/// - Byte 4-5: 输出轴速度（i16，1 dps/LSB）
/// - Byte 6-7: 输出轴角度（i16，1 degree/LSB）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStatus2 {
    pub node_id: u8,
    pub command: u8,
    /// 电机温度（℃）
    pub temperature: i8,
    /// 转矩电流（A）
    pub current: f64,
    /// 输出轴速度（degree/s）
    pub shaft_speed: f64,
    /// 输出轴角度（degree）
    pub shaft_angle: f64,
}

impl MotorStatus2 {
    /// 解析回复并校验命令字
    pub fn parse(frame: RmdFrame, command: u8) -> Result<Self, ProtocolError> {
        let status = Self::try_from(frame)?;
        if status.command != command {
            return Err(ProtocolError::UnexpectedCommand {
                expected: command,
                actual: status.command,
            });
        }
        Ok(status)
    }
}

impl TryFrom<RmdFrame> for MotorStatus2 {
    type Error = ProtocolError;

    fn try_from(frame: RmdFrame) -> Result<Self, Self::Error> {
        let node_id = node_id_from(&frame, SINGLE_MOTOR_REPLY_BASE)?;
        frame.require_full()?;

        let d = frame.data;
        Ok(Self {
            node_id,
            command: d[0],
            temperature: d[1] as i8,
            current: bytes_to_i16_le([d[2], d[3]]) as f64 * 0.01,
            shaft_speed: bytes_to_i16_le([d[4], d[5]]) as f64,
            shaft_angle: bytes_to_i16_le([d[6], d[7]]) as f64,
        })
    }
}

/// 电机关闭回复 (0x80)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownMotorFeedback {
    pub node_id: u8,
}

impl TryFrom<RmdFrame> for ShutdownMotorFeedback {
    type Error = ProtocolError;

    fn try_from(frame: RmdFrame) -> Result<Self, Self::Error> {
        let node_id = node_id_from(&frame, SINGLE_MOTOR_REPLY_BASE)?;
        if frame.len == 0 {
            return Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: 0,
            });
        }
        expect_command(&frame, CMD_SHUTDOWN_MOTOR)?;
        Ok(Self { node_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::float_to_uint;

    fn motion_reply(node: u8, p: f32, v: f32, t: f32) -> RmdFrame {
        let p_int = float_to_uint(p, MOTION_P_MIN, MOTION_P_MAX, 16);
        let v_int = float_to_uint(v, MOTION_V_MIN, MOTION_V_MAX, 12);
        let t_int = float_to_uint(t, MOTION_T_MIN, MOTION_T_MAX, 12);
        let data = [
            node,
            (p_int >> 8) as u8,
            (p_int & 0xFF) as u8,
            (v_int >> 4) as u8,
            (((v_int & 0x0F) << 4) | ((t_int >> 8) & 0x0F)) as u8,
            (t_int & 0xFF) as u8,
            0,
            0,
        ];
        RmdFrame::new_standard(0x500 + node as u16, &data)
    }

    #[test]
    fn test_motion_control_feedback_parse() {
        let fb = MotionControlFeedback::try_from(motion_reply(1, 0.785, -3.0, 1.5)).unwrap();
        assert_eq!(fb.node_id, 1);
        assert_eq!(fb.echo_node_id, 1);
        // 16 位量化误差 ≈ 25 / 65535，12 位 ≈ 90 / 4095
        assert!((fb.position - 0.785).abs() < 1e-3);
        assert!((fb.velocity + 3.0).abs() < 0.03);
        assert!((fb.torque - 1.5).abs() < 0.02);
    }

    #[test]
    fn test_motion_control_feedback_zero_is_midscale() {
        let fb = MotionControlFeedback::try_from(motion_reply(2, 0.0, 0.0, 0.0)).unwrap();
        assert!(fb.position.abs() < 1e-3);
        assert!(fb.velocity.abs() < 0.03);
        assert!(fb.torque.abs() < 0.02);
    }

    #[test]
    fn test_motion_control_feedback_invalid_id() {
        let frame = RmdFrame::new_standard(0x241, &[0; 8]);
        assert!(matches!(
            MotionControlFeedback::try_from(frame),
            Err(ProtocolError::InvalidCanId { id: 0x241 })
        ));
    }

    #[test]
    fn test_motion_control_feedback_invalid_length() {
        let frame = RmdFrame::new_standard(0x501, &[0; 4]);
        assert!(MotionControlFeedback::try_from(frame).is_err());
    }

    #[test]
    fn test_motor_status2_parse() {
        let mut data = [0u8; 8];
        data[0] = CMD_ABSOLUTE_POSITION;
        data[1] = 35;
        data[2..4].copy_from_slice(&(-150i16).to_le_bytes());
        data[4..6].copy_from_slice(&(240i16).to_le_bytes());
        data[6..8].copy_from_slice(&(-45i16).to_le_bytes());
        let frame = RmdFrame::new_standard(0x241, &data);

        let status = MotorStatus2::parse(frame, CMD_ABSOLUTE_POSITION).unwrap();
        assert_eq!(status.node_id, 1);
        assert_eq!(status.temperature, 35);
        assert!((status.current + 1.5).abs() < 1e-9);
        assert_eq!(status.shaft_speed, 240.0);
        assert_eq!(status.shaft_angle, -45.0);
    }

    #[test]
    fn test_motor_status2_wrong_command() {
        let frame = RmdFrame::new_standard(0x241, &[0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            MotorStatus2::parse(frame, CMD_ABSOLUTE_POSITION),
            Err(ProtocolError::UnexpectedCommand {
                expected: 0xA4,
                actual: 0x80
            })
        ));
    }

    #[test]
    fn test_shutdown_feedback() {
        let frame = RmdFrame::new_standard(0x243, &[0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            ShutdownMotorFeedback::try_from(frame).unwrap(),
            ShutdownMotorFeedback { node_id: 3 }
        );

        let frame = RmdFrame::new_standard(0x243, &[0xA4, 0, 0, 0, 0, 0, 0, 0]);
        assert!(ShutdownMotorFeedback::try_from(frame).is_err());
    }
}
