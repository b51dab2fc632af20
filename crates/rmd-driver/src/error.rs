//! 驱动层错误类型定义

use rmd_can::CanError;
use rmd_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 驱动错误
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 在回复超时内没有收到匹配的回复
    #[error("No reply from motor {node_id} within {timeout_ms} ms")]
    Timeout { node_id: u8, timeout_ms: u64 },

    /// 节点 ID 超出 1~32
    #[error("Invalid node id: {0} (expected 1-32)")]
    InvalidNodeId(u8),

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 是否为回复超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}
