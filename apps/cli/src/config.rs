//! 运行配置文件加载
//!
//! 配置为 TOML 格式，所有字段都可省略（使用默认值）。

use anyhow::{Result, anyhow};
use rmd_client::config::RunConfig;
use std::fs;
use std::path::Path;

/// 读取、解析并校验配置文件
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    parse_config(&content).map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))
}

/// 解析并校验配置文本
pub fn parse_config(content: &str) -> Result<RunConfig> {
    let config: RunConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmd_client::config::ControlMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
mode = "absolute_position"

[actuator]
interface = "can0"
node_id = 2

[trajectory]
amplitude_deg = 30.0
frequency_hz = 0.5

[position]
rated_speed_rpm = 100.0

[loop]
period_ms = 20
stop_on_command_error = false
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mode, ControlMode::AbsolutePosition);
        assert_eq!(config.actuator.interface, "can0");
        assert_eq!(config.actuator.node_id, 2);
        assert_eq!(config.trajectory.amplitude_deg, 30.0);
        assert_eq!(config.max_speed_dps(), 600.0);
        assert_eq!(config.control_loop.period_ms, 20);
        assert!(!config.control_loop.stop_on_command_error);
        // 未给出的段落保持默认
        assert_eq!(config.gains.kp, 15.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = parse_config("[actuator]\nnode_id = 0\n").unwrap_err();
        assert!(err.to_string().contains("Invalid node id 0"));

        let err = parse_config("[gains]\nkp = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("gains.kp"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse_config("[actuator]\nbaud_rate = 1000000\n").is_err());
        assert!(parse_config("mode = \"velocity\"\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
