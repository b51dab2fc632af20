//! SocketCAN CAN 适配器实现
//!
//! 基于 Linux 内核 SocketCAN 子系统。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**
//! - **接口配置**：波特率由系统工具（`ip link`）完成，不在应用层设置
//! - **权限要求**：可能需要 `sudo`

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, RmdFrame};
use socketcan::{
    CanError as SocketCanError, CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Frame, Socket,
    StandardId,
};
use std::io::ErrorKind;
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use tracing::{trace, warn};

mod interface_check;

use interface_check::check_interface_status;

/// 默认读超时
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(2);

/// SO_RCVTIMEO 为 0 表示无限阻塞，非阻塞读取用最小超时代替
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// SocketCAN 适配器
///
/// # 示例
///
/// ```no_run
/// use rmd_can::{CanAdapter, RmdFrame, SocketCanAdapter};
///
/// let mut adapter = SocketCanAdapter::new("can0").unwrap();
/// adapter.send(RmdFrame::new_standard(0x141, &[0x80])).unwrap();
/// let reply = adapter.receive().unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    /// 接口名称（如 "can0"）
    interface: String,
    /// 读超时时间（用于 receive 方法）
    read_timeout: Duration,
}

impl SocketCanAdapter {
    /// 创建新的 SocketCAN 适配器
    ///
    /// 打开前检查接口存在且处于 UP 状态，否则返回带修复提示的错误。
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        let interface = interface.into();

        if !check_interface_status(&interface)? {
            return Err(CanDeviceError::new(
                CanDeviceErrorKind::NotUp,
                format!(
                    "CAN interface '{}' exists but is not UP. Please start it first:\n  sudo ip link set up {}",
                    interface, interface
                ),
            )
            .into());
        }
        trace!("CAN interface '{}' is UP, opening socket", interface);

        let socket = CanSocket::open(&interface).map_err(|e| {
            let kind = if e.kind() == ErrorKind::PermissionDenied {
                CanDeviceErrorKind::AccessDenied
            } else {
                CanDeviceErrorKind::Backend
            };
            CanDeviceError::new(
                kind,
                format!("Failed to open CAN interface '{}': {}", interface, e),
            )
        })?;

        // 禁用 loopback，避免自己发出的请求被当作回复读回
        let loopback_enabled: libc::c_int = 0;
        let loopback_result = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::SOL_CAN_RAW,
                libc::CAN_RAW_LOOPBACK,
                &loopback_enabled as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if loopback_result < 0 {
            warn!(
                "Failed to disable CAN_RAW_LOOPBACK on '{}': {}",
                interface,
                std::io::Error::last_os_error()
            );
        }

        socket.set_read_timeout(DEFAULT_READ_TIMEOUT)?;

        trace!("SocketCAN interface '{}' opened", interface);
        Ok(Self {
            socket,
            interface,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// 获取接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 获取读超时时间
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// 设置读超时
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), CanError> {
        self.socket.set_read_timeout(timeout.max(MIN_READ_TIMEOUT))?;
        self.read_timeout = timeout;
        Ok(())
    }

    fn to_can_frame(frame: &RmdFrame) -> Result<CanFrame, CanError> {
        let payload = frame.data_slice();
        let can_frame = if frame.is_extended {
            ExtendedId::new(frame.id).and_then(|id| CanFrame::new(id, payload))
        } else {
            StandardId::new(frame.id as u16).and_then(|id| CanFrame::new(id, payload))
        };
        can_frame.ok_or_else(|| {
            CanDeviceError::new(
                CanDeviceErrorKind::InvalidFrame,
                format!("Failed to create CAN frame with ID 0x{:X}", frame.id),
            )
            .into()
        })
    }
}

impl Drop for SocketCanAdapter {
    fn drop(&mut self) {
        trace!("[Auto-Drop] SocketCAN interface '{}' closed", self.interface);
    }
}

impl CanAdapter for SocketCanAdapter {
    fn send(&mut self, frame: RmdFrame) -> Result<(), CanError> {
        let can_frame = Self::to_can_frame(&frame)?;
        self.socket.write_frame(&can_frame)?;
        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }

    /// 自动过滤错误帧和远程帧，只返回数据帧
    fn receive(&mut self) -> Result<RmdFrame, CanError> {
        loop {
            let can_frame = match self.socket.read_frame() {
                Ok(f) => f,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(CanError::Timeout);
                },
                Err(e) => return Err(CanError::Io(e)),
            };

            match can_frame {
                CanFrame::Data(_) => {},
                CanFrame::Error(error_frame) => {
                    match SocketCanError::from(error_frame) {
                        SocketCanError::BusOff => return Err(CanError::BusOff),
                        other => warn!("CAN error frame on '{}': {}", self.interface, other),
                    }
                    continue;
                },
                CanFrame::Remote(_) => continue,
            }

            let mut data = [0u8; 8];
            let payload = can_frame.data();
            let len = payload.len().min(8);
            data[..len].copy_from_slice(&payload[..len]);

            let frame = RmdFrame {
                id: can_frame.raw_id(),
                data,
                len: len as u8,
                is_extended: can_frame.is_extended(),
                timestamp_us: 0,
            };
            trace!("Received CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
            return Ok(frame);
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        if let Err(e) = self.set_read_timeout(timeout) {
            warn!("Failed to set receive timeout: {}", e);
        }
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<RmdFrame, CanError> {
        let old_timeout = self.read_timeout;
        self.set_read_timeout(timeout)?;
        let result = self.receive();
        let _ = self.set_read_timeout(old_timeout);
        result
    }
}
