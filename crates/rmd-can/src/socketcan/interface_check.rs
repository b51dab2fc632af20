//! CAN 接口状态检查
//!
//! 只读取 `/sys/class/net/<iface>/flags`，不做任何自动配置。

use crate::{CanDeviceError, CanDeviceErrorKind, CanError};
use std::fs;
use std::path::Path;

const SYSFS_NET: &str = "/sys/class/net";

/// 检查接口是否存在且处于 UP 状态
///
/// - `Ok(true)`: 接口存在且已启动
/// - `Ok(false)`: 接口存在但未启动
/// - `Err(CanError::Device)`: 接口不存在或无法读取状态
pub(crate) fn check_interface_status(interface: &str) -> Result<bool, CanError> {
    let dir = Path::new(SYSFS_NET).join(interface);
    if !dir.exists() {
        return Err(CanDeviceError::new(
            CanDeviceErrorKind::NotFound,
            format!(
                "CAN interface '{}' does not exist. Create it first, e.g.:\n  sudo ip link set {} type can bitrate 1000000\n  sudo ip link set up {}",
                interface, interface, interface
            ),
        )
        .into());
    }

    let raw = fs::read_to_string(dir.join("flags"))?;
    let flags = parse_flags(&raw).ok_or_else(|| {
        CanDeviceError::new(
            CanDeviceErrorKind::Backend,
            format!("Unreadable flags for '{}': {:?}", interface, raw.trim()),
        )
    })?;

    Ok(flags & libc::IFF_UP as u32 != 0)
}

/// 解析 sysfs 中的十六进制标志位（如 `0x40c1`）
fn parse_flags(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(hex, 16).ok()
}
