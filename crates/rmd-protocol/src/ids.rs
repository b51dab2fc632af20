//! CAN ID 规则与命令字定义
//!
//! RMD 电机按节点 ID（1~32）区分：
//! - 单电机命令：请求 `0x140 + id`，回复 `0x240 + id`
//! - 运控模式命令：请求 `0x400 + id`，回复 `0x500 + id`

/// 单电机命令请求基 ID
pub const SINGLE_MOTOR_REQUEST_BASE: u32 = 0x140;

/// 单电机命令回复基 ID
pub const SINGLE_MOTOR_REPLY_BASE: u32 = 0x240;

/// 运控模式请求基 ID
pub const MOTION_CONTROL_REQUEST_BASE: u32 = 0x400;

/// 运控模式回复基 ID
pub const MOTION_CONTROL_REPLY_BASE: u32 = 0x500;

/// 节点 ID 上限
pub const MAX_NODE_ID: u8 = 32;

// ============================================================================
// 命令字（Byte 0）
// ============================================================================

/// 功能控制
pub const CMD_FUNCTION_CONTROL: u8 = 0x20;

/// 读取 PID 参数
pub const CMD_READ_PID_PARAMETERS: u8 = 0x30;

/// 写入 PID 参数到 RAM（掉电丢失）
pub const CMD_WRITE_PID_PARAMETERS_TO_RAM: u8 = 0x31;

/// 写入 PID 参数到 ROM（掉电保存）
pub const CMD_WRITE_PID_PARAMETERS_TO_ROM: u8 = 0x32;

/// 系统复位
pub const CMD_SYSTEM_RESET: u8 = 0x76;

/// 电机关闭
pub const CMD_SHUTDOWN_MOTOR: u8 = 0x80;

/// 绝对位置闭环控制
pub const CMD_ABSOLUTE_POSITION: u8 = 0xA4;

/// 单电机请求 ID
pub fn single_motor_request_id(node_id: u8) -> u32 {
    SINGLE_MOTOR_REQUEST_BASE + node_id as u32
}

/// 单电机回复 ID
pub fn single_motor_reply_id(node_id: u8) -> u32 {
    SINGLE_MOTOR_REPLY_BASE + node_id as u32
}

/// 运控请求 ID
pub fn motion_control_request_id(node_id: u8) -> u32 {
    MOTION_CONTROL_REQUEST_BASE + node_id as u32
}

/// 运控回复 ID
pub fn motion_control_reply_id(node_id: u8) -> u32 {
    MOTION_CONTROL_REPLY_BASE + node_id as u32
}

/// 节点 ID 是否在协议允许范围内（1~32）
pub fn is_valid_node_id(node_id: u8) -> bool {
    (1..=MAX_NODE_ID).contains(&node_id)
}
