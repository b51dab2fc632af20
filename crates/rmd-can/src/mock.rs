//! Mock CAN 适配器
//!
//! 在帧级别模拟一个 RMD 电机：解析请求帧，更新内部状态并排队回复帧。
//! 用于无硬件的端到端测试和 `--mock` 演示运行。
//!
//! 测试代码通过 [`MockActuatorHandle`] 检查已发送的帧或注入故障，
//! 即使适配器已经被移动到驱动内部。

use crate::{CanAdapter, CanDeviceError, CanDeviceErrorKind, CanError, RmdFrame};
use rmd_protocol::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// 句柄保留的最近发送帧数量
pub const MAX_RECENT_FRAMES: usize = 256;

/// 模拟电机状态
#[derive(Debug)]
struct MockActuatorState {
    node_id: u8,
    /// 0x20 / SetCanId 写入的 ID，复位后生效
    pending_node_id: Option<u8>,
    /// 输出轴角度（rad）
    position: f32,
    /// 输出轴速度（rad/s）
    velocity: f32,
    /// 输出力矩（N·m）
    torque: f32,
    temperature: i8,
    running: bool,
    gains: HashMap<GainType, f32>,
    rx_queue: VecDeque<RmdFrame>,
    /// 最近发送的帧（环形，最多 [`MAX_RECENT_FRAMES`] 个）
    recent_frames: VecDeque<RmdFrame>,
    /// 单电机命令字 -> 累计发送次数
    single_motor_counts: HashMap<u8, usize>,
    motion_control_count: usize,

    // 故障注入
    fail_send: bool,
    silent: bool,
    reject_shutdown: bool,
}

impl MockActuatorState {
    fn new(node_id: u8) -> Self {
        Self {
            node_id,
            pending_node_id: None,
            position: 0.0,
            velocity: 0.0,
            torque: 0.0,
            temperature: 30,
            running: false,
            gains: HashMap::new(),
            rx_queue: VecDeque::new(),
            recent_frames: VecDeque::with_capacity(MAX_RECENT_FRAMES),
            single_motor_counts: HashMap::new(),
            motion_control_count: 0,
            fail_send: false,
            silent: false,
            reject_shutdown: false,
        }
    }

    fn reply(&mut self, frame: RmdFrame) {
        if !self.silent {
            self.rx_queue.push_back(frame);
        }
    }

    fn single_reply(&mut self, data: [u8; 8]) {
        let id = single_motor_reply_id(self.node_id) as u16;
        self.reply(RmdFrame::new_standard(id, &data));
    }

    fn handle(&mut self, frame: RmdFrame) {
        if frame.id == motion_control_request_id(self.node_id) {
            self.handle_motion_control(&frame);
        } else if frame.id == single_motor_request_id(self.node_id) {
            self.handle_single_motor(&frame);
        } else {
            trace!("Mock actuator ignoring frame ID=0x{:X}", frame.id);
        }
    }

    fn handle_motion_control(&mut self, frame: &RmdFrame) {
        let d = frame.data;
        let p_raw = ((d[0] as u32) << 8) | d[1] as u32;
        let v_raw = ((d[2] as u32) << 4) | (d[3] >> 4) as u32;
        let kp_raw = (((d[3] & 0x0F) as u32) << 8) | d[4] as u32;
        let kd_raw = ((d[5] as u32) << 4) | (d[6] >> 4) as u32;
        let t_raw = (((d[6] & 0x0F) as u32) << 8) | d[7] as u32;

        let p_des = uint_to_float(p_raw, MOTION_P_MIN, MOTION_P_MAX, 16);
        let v_des = uint_to_float(v_raw, MOTION_V_MIN, MOTION_V_MAX, 12);
        let kp = uint_to_float(kp_raw, MOTION_KP_MIN, MOTION_KP_MAX, 12);
        let kd = uint_to_float(kd_raw, MOTION_KD_MIN, MOTION_KD_MAX, 12);
        let t_ff = uint_to_float(t_raw, MOTION_T_MIN, MOTION_T_MAX, 12);

        // 理想跟踪：输出轴直接到达目标，力矩取 PD 律在到达前的值
        self.torque = (kp * (p_des - self.position) + kd * (v_des - self.velocity) + t_ff)
            .clamp(MOTION_T_MIN, MOTION_T_MAX);
        self.position = p_des;
        self.velocity = v_des;
        self.running = true;

        let p_int = float_to_uint(self.position, MOTION_P_MIN, MOTION_P_MAX, 16);
        let v_int = float_to_uint(self.velocity, MOTION_V_MIN, MOTION_V_MAX, 12);
        let t_int = float_to_uint(self.torque, MOTION_T_MIN, MOTION_T_MAX, 12);
        let data = [
            self.node_id,
            (p_int >> 8) as u8,
            (p_int & 0xFF) as u8,
            (v_int >> 4) as u8,
            (((v_int & 0x0F) << 4) | ((t_int >> 8) & 0x0F)) as u8,
            (t_int & 0xFF) as u8,
            0,
            0,
        ];
        let id = motion_control_reply_id(self.node_id) as u16;
        self.reply(RmdFrame::new_standard(id, &data));
    }

    fn handle_single_motor(&mut self, frame: &RmdFrame) {
        let d = frame.data;
        match d[0] {
            CMD_ABSOLUTE_POSITION => {
                let max_speed = u16::from_le_bytes([d[2], d[3]]) as f32;
                let target_deg = bytes_to_i32_le([d[4], d[5], d[6], d[7]]) as f32 / 100.0;
                let previous_deg = self.position.to_degrees();
                self.position = target_deg.to_radians();
                // 速度按 10 ms 周期估算，受最大速度限制
                let speed_dps = ((target_deg - previous_deg) / 0.01).clamp(-max_speed, max_speed);
                self.velocity = speed_dps.to_radians();
                self.running = true;

                let current = (self.torque * 100.0) as i16;
                let mut data = [0u8; 8];
                data[0] = CMD_ABSOLUTE_POSITION;
                data[1] = self.temperature as u8;
                data[2..4].copy_from_slice(&current.to_le_bytes());
                data[4..6].copy_from_slice(&(speed_dps.round() as i16).to_le_bytes());
                data[6..8].copy_from_slice(&(target_deg.round() as i16).to_le_bytes());
                self.single_reply(data);
            },
            CMD_SHUTDOWN_MOTOR => {
                if self.reject_shutdown {
                    return;
                }
                self.running = false;
                self.velocity = 0.0;
                self.torque = 0.0;
                self.single_reply([CMD_SHUTDOWN_MOTOR, 0, 0, 0, 0, 0, 0, 0]);
            },
            CMD_READ_PID_PARAMETERS
            | CMD_WRITE_PID_PARAMETERS_TO_RAM
            | CMD_WRITE_PID_PARAMETERS_TO_ROM => {
                let Ok(gain_type) = GainType::try_from(d[1]) else {
                    return;
                };
                if d[0] != CMD_READ_PID_PARAMETERS {
                    self.gains
                        .insert(gain_type, bytes_to_f32_le([d[4], d[5], d[6], d[7]]));
                }
                let value = self.gains.get(&gain_type).copied().unwrap_or_default();
                let mut data = [d[0], d[1], 0, 0, 0, 0, 0, 0];
                data[4..8].copy_from_slice(&value.to_le_bytes());
                self.single_reply(data);
            },
            CMD_FUNCTION_CONTROL => {
                if d[1] == u8::from(FunctionControlType::SetCanId) {
                    self.pending_node_id = Some(d[4]);
                }
                self.single_reply(d);
            },
            CMD_SYSTEM_RESET => {
                if let Some(id) = self.pending_node_id.take() {
                    self.node_id = id;
                }
                self.running = false;
                self.velocity = 0.0;
                self.torque = 0.0;
            },
            other => trace!("Mock actuator ignoring command 0x{:02X}", other),
        }
    }

    fn record_sent(&mut self, frame: RmdFrame) {
        if self.recent_frames.len() == MAX_RECENT_FRAMES {
            self.recent_frames.pop_front();
        }
        self.recent_frames.push_back(frame);

        if is_request_for(&frame, SINGLE_MOTOR_REQUEST_BASE) {
            *self.single_motor_counts.entry(frame.data[0]).or_insert(0) += 1;
        } else if is_request_for(&frame, MOTION_CONTROL_REQUEST_BASE) {
            self.motion_control_count += 1;
        }
    }
}

fn is_request_for(frame: &RmdFrame, base: u32) -> bool {
    frame.id > base && frame.id <= base + MAX_NODE_ID as u32
}

/// Mock CAN 适配器（模拟单个电机）
#[derive(Debug, Clone)]
pub struct MockCanAdapter {
    state: Arc<Mutex<MockActuatorState>>,
}

impl MockCanAdapter {
    /// 创建模拟节点 `node_id` 的适配器
    pub fn new(node_id: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockActuatorState::new(node_id))),
        }
    }

    /// 获取检查/故障注入句柄
    pub fn handle(&self) -> MockActuatorHandle {
        MockActuatorHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockActuatorState>, CanError> {
        self.state.lock().map_err(|_| {
            CanDeviceError::new(CanDeviceErrorKind::Backend, "mock state poisoned").into()
        })
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: RmdFrame) -> Result<(), CanError> {
        let mut state = self.lock()?;
        if state.fail_send {
            return Err(CanError::Io(std::io::Error::other("mock send failure")));
        }
        state.record_sent(frame);
        state.handle(frame);
        Ok(())
    }

    fn receive(&mut self) -> Result<RmdFrame, CanError> {
        self.lock()?.rx_queue.pop_front().ok_or(CanError::Timeout)
    }
}

/// 模拟电机的检查与故障注入句柄
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    state: Arc<Mutex<MockActuatorState>>,
}

impl MockActuatorHandle {
    fn with<R>(&self, f: impl FnOnce(&mut MockActuatorState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// 当前生效的节点 ID
    pub fn node_id(&self) -> u8 {
        self.with(|s| s.node_id)
    }

    /// 输出轴角度（rad）
    pub fn position(&self) -> f32 {
        self.with(|s| s.position)
    }

    /// 最近一次运控/位置命令后电机是否在运行
    pub fn is_running(&self) -> bool {
        self.with(|s| s.running)
    }

    /// 最近发送的帧（按发送顺序，最多 [`MAX_RECENT_FRAMES`] 个）
    pub fn sent_frames(&self) -> Vec<RmdFrame> {
        self.with(|s| s.recent_frames.iter().copied().collect())
    }

    /// 累计发送的命令字为 `command` 的单电机帧数量
    pub fn count_single_motor_commands(&self, command: u8) -> usize {
        self.with(|s| s.single_motor_counts.get(&command).copied().unwrap_or(0))
    }

    /// 累计发送的运控帧数量
    pub fn count_motion_control_frames(&self) -> usize {
        self.with(|s| s.motion_control_count)
    }

    /// 后续 `send` 全部失败
    pub fn set_fail_send(&self, fail: bool) {
        self.with(|s| s.fail_send = fail);
    }

    /// 电机不再回复任何帧
    pub fn set_silent(&self, silent: bool) {
        self.with(|s| s.silent = silent);
    }

    /// 电机忽略关机命令（不回复）
    pub fn set_reject_shutdown(&self, reject: bool) {
        self.with(|s| s.reject_shutdown = reject);
    }

    /// 向接收队列注入任意帧（模拟总线上其他节点的流量）
    pub fn inject_frame(&self, frame: RmdFrame) {
        self.with(|s| s.rx_queue.push_back(frame));
    }
}
