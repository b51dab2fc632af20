//! 参数帧结构体定义
//!
//! 控制器增益读写（0x30 / 0x31 / 0x32）与功能控制（0x20）。

use crate::RmdFrame;
use crate::feedback::{expect_command, node_id_from};
use crate::ids::*;
use crate::{ProtocolError, bytes_to_f32_le, bytes_to_u32_le};

// ============================================================================
// 控制器增益
// ============================================================================

/// 控制器增益索引（Byte 1）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum GainType {
    CurrentLoopKp = 0x01,
    CurrentLoopKi = 0x02,
    SpeedLoopKp = 0x04,
    SpeedLoopKi = 0x05,
    PositionLoopKp = 0x07,
    PositionLoopKi = 0x08,
    PositionLoopKd = 0x09,
}

/// 增益操作类型（决定命令字）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainAccess {
    /// 读取 (0x30)
    Read,
    /// 写入 RAM，掉电丢失 (0x31)
    WriteRam,
    /// 写入 ROM，掉电保存 (0x32)
    WriteRom,
}

impl GainAccess {
    pub fn command(self) -> u8 {
        match self {
            GainAccess::Read => CMD_READ_PID_PARAMETERS,
            GainAccess::WriteRam => CMD_WRITE_PID_PARAMETERS_TO_RAM,
            GainAccess::WriteRom => CMD_WRITE_PID_PARAMETERS_TO_ROM,
        }
    }
}

/// 增益读写指令
///
/// - Byte 0: 命令字（0x30 / 0x31 / 0x32）
/// - Byte 1: 增益索引
/// - Byte 4-7: 增益值（f32，小端，读取时为 0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRequest {
    pub node_id: u8,
    pub access: GainAccess,
    pub gain_type: GainType,
    pub value: f32,
}

impl GainRequest {
    /// 读取单个增益
    pub fn read(node_id: u8, gain_type: GainType) -> Self {
        Self {
            node_id,
            access: GainAccess::Read,
            gain_type,
            value: 0.0,
        }
    }

    /// 写入单个增益（RAM）
    pub fn write_ram(node_id: u8, gain_type: GainType, value: f32) -> Self {
        Self {
            node_id,
            access: GainAccess::WriteRam,
            gain_type,
            value,
        }
    }

    /// 写入单个增益（ROM）
    pub fn write_rom(node_id: u8, gain_type: GainType, value: f32) -> Self {
        Self {
            node_id,
            access: GainAccess::WriteRom,
            gain_type,
            value,
        }
    }

    pub fn to_frame(self) -> RmdFrame {
        let mut data = [0u8; 8];
        data[0] = self.access.command();
        data[1] = self.gain_type.into();
        if self.access != GainAccess::Read {
            data[4..8].copy_from_slice(&self.value.to_le_bytes());
        }
        RmdFrame::new_standard(single_motor_request_id(self.node_id) as u16, &data)
    }
}

/// 增益读写回复（布局与请求相同）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainFeedback {
    pub node_id: u8,
    pub command: u8,
    pub gain_type: GainType,
    pub value: f32,
}

impl GainFeedback {
    /// 解析回复并校验命令字
    pub fn parse(frame: RmdFrame, access: GainAccess) -> Result<Self, ProtocolError> {
        expect_command(&frame, access.command())?;
        Self::try_from(frame)
    }
}

impl TryFrom<RmdFrame> for GainFeedback {
    type Error = ProtocolError;

    fn try_from(frame: RmdFrame) -> Result<Self, Self::Error> {
        let node_id = node_id_from(&frame, SINGLE_MOTOR_REPLY_BASE)?;
        frame.require_full()?;

        let d = frame.data;
        let gain_type = GainType::try_from(d[1]).map_err(|_| ProtocolError::InvalidValue {
            field: "GainType".to_string(),
            value: d[1],
        })?;

        Ok(Self {
            node_id,
            command: d[0],
            gain_type,
            value: bytes_to_f32_le([d[4], d[5], d[6], d[7]]),
        })
    }
}

// ============================================================================
// 功能控制
// ============================================================================

/// 功能控制索引（Byte 1）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum FunctionControlType {
    /// 清除多圈值，重新上电生效
    ClearMultiTurnValue = 0x01,
    /// CAN ID 过滤使能（1 使能，0 关闭）
    CanIdFilterEnable = 0x02,
    /// 错误状态主动上报使能
    ErrorStatusTransmissionEnable = 0x03,
    /// 保存多圈值到 ROM
    SaveMultiTurnValue = 0x04,
    /// 设置 CAN ID（1~32），重启后生效
    SetCanId = 0x05,
    /// 位置模式正向最大位置（0.01 degree/LSB）
    SetMaxPositivePosition = 0x06,
    /// 位置模式负向最大位置（0.01 degree/LSB）
    SetMaxNegativePosition = 0x07,
}

/// 功能控制指令 (0x20)
///
/// - Byte 1: 功能索引
/// - Byte 4-7: 参数值（u32，小端）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionControlCommand {
    pub node_id: u8,
    pub function: FunctionControlType,
    pub value: u32,
}

impl FunctionControlCommand {
    pub fn new(node_id: u8, function: FunctionControlType, value: u32) -> Self {
        Self {
            node_id,
            function,
            value,
        }
    }

    pub fn to_frame(self) -> RmdFrame {
        let mut data = [0u8; 8];
        data[0] = CMD_FUNCTION_CONTROL;
        data[1] = self.function.into();
        data[4..8].copy_from_slice(&self.value.to_le_bytes());
        RmdFrame::new_standard(single_motor_request_id(self.node_id) as u16, &data)
    }
}

/// 功能控制回复 (0x20)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionControlFeedback {
    pub node_id: u8,
    pub function: FunctionControlType,
    pub value: u32,
}

impl TryFrom<RmdFrame> for FunctionControlFeedback {
    type Error = ProtocolError;

    fn try_from(frame: RmdFrame) -> Result<Self, Self::Error> {
        let node_id = node_id_from(&frame, SINGLE_MOTOR_REPLY_BASE)?;
        frame.require_full()?;
        expect_command(&frame, CMD_FUNCTION_CONTROL)?;

        let d = frame.data;
        let function =
            FunctionControlType::try_from(d[1]).map_err(|_| ProtocolError::InvalidValue {
                field: "FunctionControlType".to_string(),
                value: d[1],
            })?;

        Ok(Self {
            node_id,
            function,
            value: bytes_to_u32_le([d[4], d[5], d[6], d[7]]),
        })
    }
}
