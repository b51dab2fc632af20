//! # RMD Protocol
//!
//! MyActuator RMD 系列电机 CAN 总线协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 规则与命令字
//! - `control`: 控制帧构建（运控、绝对位置、关机、复位）
//! - `feedback`: 回复帧解析
//! - `config`: 参数帧（增益读写、功能控制）
//!
//! ## 字节序
//!
//! 单电机命令（0x140 + ID）使用 Intel 小端字节序；
//! 运控命令（0x400 + ID）使用跨字节位域打包，高位在前。

pub mod config;
pub mod control;
pub mod feedback;
pub mod ids;

// 重新导出常用类型
pub use config::*;
pub use control::*;
pub use feedback::*;
pub use ids::*;

/// CAN 2.0 标准帧的统一抽象
///
/// `RmdFrame` 是协议层和硬件层之间的中间抽象：
/// 协议层只负责 `RmdFrame` 与命令/回复结构体之间的转换，
/// CAN 层（`rmd-can`）负责与 SocketCAN 等具体实现之间的转换。
///
/// ```text
/// Protocol Layer (rmd-protocol)
///     ↓ TryFrom<RmdFrame> 解析 / to_frame() 构建
/// RmdFrame (此类型)
///     ↓
/// CAN Layer (rmd-can)
///     ↓
/// Hardware
/// ```
///
/// # 示例
///
/// ```rust
/// use rmd_protocol::RmdFrame;
///
/// let frame = RmdFrame::new_standard(0x141, &[0x80]);
/// assert_eq!(frame.id(), 0x141);
/// assert_eq!(frame.data(), &[0x80, 0, 0, 0, 0, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RmdFrame {
    /// CAN ID（标准帧 11 bit）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID），RMD 协议只使用标准帧
    pub is_extended: bool,

    /// 时间戳（微秒），0 表示不可用
    pub timestamp_us: u64,
}

impl RmdFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
            timestamp_us: 0,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取完整数据（8字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }

    /// 校验数据长度为完整 8 字节
    pub(crate) fn require_full(&self) -> Result<(), ProtocolError> {
        if self.len < 8 {
            return Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: self.len as usize,
            });
        }
        Ok(())
    }
}

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Unexpected command byte: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedCommand { expected: u8, actual: u8 },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },
}

/// 小端字节序转 i16
pub fn bytes_to_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

/// 小端字节序转 i32
pub fn bytes_to_i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// 小端字节序转 u32
pub fn bytes_to_u32_le(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// 小端字节序转 f32（IEEE 754）
pub fn bytes_to_f32_le(bytes: [u8; 4]) -> f32 {
    f32::from_le_bytes(bytes)
}
