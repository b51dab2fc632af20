//! 客户端错误类型
//!
//! - [`ConnectionError`]: 启动阶段，致命且不重试
//! - [`CommandError`]: 运行中一次总线往返失败，结束本次运行
//! - [`StopError`]: 关机命令失败，由 `ShutdownController` 吸收并上报
//! - [`ConfigError`]: 运行配置不合法
//! - [`RunError`]: `ControlLoop::run` 的失败结果

use crate::control::RunReport;
use rmd_driver::DriverError;
use thiserror::Error;

/// 无法为 (interface, node id) 建立执行器端口
#[derive(Error, Debug)]
#[error("Failed to connect to motor {node_id} on {interface}: {source}")]
pub struct ConnectionError {
    pub interface: String,
    pub node_id: u8,
    #[source]
    pub source: DriverError,
}

/// 运行中的命令失败
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Actuator command failed: {0}")]
    Driver(#[from] DriverError),

    #[error("Actuator command failed: {0}")]
    Rejected(String),
}

/// 关机命令失败
#[derive(Error, Debug)]
pub enum StopError {
    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("{0}")]
    Rejected(String),
}

/// 运行配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid node id {0}: expected 1-32")]
    InvalidNodeId(u8),

    #[error("CAN interface name must not be empty")]
    EmptyInterface,

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("Control period must be greater than zero")]
    ZeroPeriod,
}

/// 控制循环失败
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// 命令失败导致循环进入 Faulted（无论随后的关机是否成功）
    #[error("{source}")]
    Command {
        #[source]
        source: CommandError,
        report: RunReport,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError {
            interface: "can2".to_string(),
            node_id: 1,
            source: DriverError::InvalidNodeId(0),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to motor 1 on can2: Invalid node id: 0 (expected 1-32)"
        );
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::from(DriverError::Timeout {
            node_id: 1,
            timeout_ms: 50,
        });
        assert_eq!(
            err.to_string(),
            "Actuator command failed: No reply from motor 1 within 50 ms"
        );
        assert_eq!(
            CommandError::Rejected("bus off".into()).to_string(),
            "Actuator command failed: bus off"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::OutOfRange {
            field: "trajectory.frequency_hz",
            expected: "> 0",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "trajectory.frequency_hz must be > 0, got 0");
    }
}
