//! 单电机请求/回复接口

use crate::error::DriverError;
use rmd_can::{CanAdapter, CanError, RmdFrame};
use rmd_protocol::*;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// 默认回复超时
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(50);

/// 发送前最多丢弃的积压帧数量
const MAX_STALE_FRAMES: usize = 64;

/// RMD 电机接口
///
/// 独占一个 CAN 适配器，所有操作都是阻塞的：发送请求帧后等待
/// `reply_id` 匹配且命令字一致的回复。
///
/// # Example
///
/// ```no_run
/// use rmd_can::SocketCanAdapter;
/// use rmd_driver::ActuatorInterface;
///
/// let can = SocketCanAdapter::new("can0").unwrap();
/// let mut actuator = ActuatorInterface::new(can, 1).unwrap();
/// let fb = actuator.motion_control(0.0, 0.0, 15.0, 1.0, 0.0).unwrap();
/// println!("position = {} rad", fb.position);
/// actuator.shutdown_motor().unwrap();
/// ```
#[derive(Debug)]
pub struct ActuatorInterface<A: CanAdapter> {
    can: A,
    node_id: u8,
    reply_timeout: Duration,
}

impl<A: CanAdapter> ActuatorInterface<A> {
    /// 绑定到节点 `node_id`（1~32）
    pub fn new(can: A, node_id: u8) -> Result<Self, DriverError> {
        if !is_valid_node_id(node_id) {
            return Err(DriverError::InvalidNodeId(node_id));
        }
        Ok(Self {
            can,
            node_id,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        })
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    // ------------------------------------------------------------------
    // 控制
    // ------------------------------------------------------------------

    /// 运控模式（位置 rad、速度 rad/s、力矩 N·m）
    pub fn motion_control(
        &mut self,
        p_des: f32,
        v_des: f32,
        kp: f32,
        kd: f32,
        t_ff: f32,
    ) -> Result<MotionControlFeedback, DriverError> {
        let frame = MotionControlCommand::new(self.node_id, p_des, v_des, kp, kd, t_ff).to_frame();
        let reply_id = motion_control_reply_id(self.node_id);
        let reply = self.request(frame, reply_id, |_| true)?;
        Ok(MotionControlFeedback::try_from(reply)?)
    }

    /// 绝对位置闭环控制（角度 degree，最大速度 degree/s）
    pub fn send_position_absolute_setpoint(
        &mut self,
        angle_deg: f64,
        max_speed_dps: f64,
    ) -> Result<MotorStatus2, DriverError> {
        let frame = AbsolutePositionCommand::new(self.node_id, angle_deg, max_speed_dps).to_frame();
        let reply = self.single_motor_request(frame, CMD_ABSOLUTE_POSITION)?;
        Ok(MotorStatus2::parse(reply, CMD_ABSOLUTE_POSITION)?)
    }

    /// 关闭电机输出
    pub fn shutdown_motor(&mut self) -> Result<(), DriverError> {
        let frame = ShutdownMotorCommand::new(self.node_id).to_frame();
        let reply = self.single_motor_request(frame, CMD_SHUTDOWN_MOTOR)?;
        ShutdownMotorFeedback::try_from(reply)?;
        debug!("Motor {} shut down", self.node_id);
        Ok(())
    }

    /// 系统复位（电机不回复）
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.can
            .send(SystemResetCommand::new(self.node_id).to_frame())?;
        debug!("Motor {} reset requested", self.node_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 参数
    // ------------------------------------------------------------------

    /// 读取单个控制器增益
    pub fn get_single_gain(&mut self, gain_type: GainType) -> Result<f32, DriverError> {
        self.gain_request(GainRequest::read(self.node_id, gain_type))
    }

    /// 写入单个控制器增益到 RAM，返回电机回显的值
    pub fn set_single_gain(&mut self, gain_type: GainType, value: f32) -> Result<f32, DriverError> {
        self.gain_request(GainRequest::write_ram(self.node_id, gain_type, value))
    }

    /// 写入单个控制器增益到 ROM（掉电保存），返回电机回显的值
    pub fn set_single_gain_persistently(
        &mut self,
        gain_type: GainType,
        value: f32,
    ) -> Result<f32, DriverError> {
        self.gain_request(GainRequest::write_rom(self.node_id, gain_type, value))
    }

    /// 功能控制
    pub fn function_control(
        &mut self,
        function: FunctionControlType,
        value: u32,
    ) -> Result<FunctionControlFeedback, DriverError> {
        let frame = FunctionControlCommand::new(self.node_id, function, value).to_frame();
        let reply = self.single_motor_request(frame, CMD_FUNCTION_CONTROL)?;
        let feedback = FunctionControlFeedback::try_from(reply)?;
        if feedback.function != function {
            return Err(DriverError::InvalidInput(format!(
                "function control reply for {:?}, expected {:?}",
                feedback.function, function
            )));
        }
        Ok(feedback)
    }

    /// 修改 CAN ID：写入新 ID，复位电机，并把接口重新绑定到新 ID
    pub fn set_can_id(&mut self, new_id: u8) -> Result<(), DriverError> {
        if !is_valid_node_id(new_id) {
            return Err(DriverError::InvalidNodeId(new_id));
        }
        self.function_control(FunctionControlType::SetCanId, new_id as u32)?;
        self.reset()?;
        debug!("Motor CAN id changed: {} -> {}", self.node_id, new_id);
        self.node_id = new_id;
        Ok(())
    }

    // ------------------------------------------------------------------
    // 内部
    // ------------------------------------------------------------------

    fn gain_request(&mut self, request: GainRequest) -> Result<f32, DriverError> {
        let command = request.access.command();
        let reply = self.single_motor_request(request.to_frame(), command)?;
        let feedback = GainFeedback::parse(reply, request.access)?;
        if feedback.gain_type != request.gain_type {
            return Err(DriverError::InvalidInput(format!(
                "gain reply for {:?}, expected {:?}",
                feedback.gain_type, request.gain_type
            )));
        }
        Ok(feedback.value)
    }

    fn single_motor_request(&mut self, frame: RmdFrame, command: u8) -> Result<RmdFrame, DriverError> {
        let reply_id = single_motor_reply_id(self.node_id);
        self.request(frame, reply_id, |reply| reply.len > 0 && reply.data[0] == command)
    }

    /// 发送请求并等待匹配的回复
    fn request(
        &mut self,
        frame: RmdFrame,
        reply_id: u32,
        accept: impl Fn(&RmdFrame) -> bool,
    ) -> Result<RmdFrame, DriverError> {
        self.drain_stale_frames()?;
        self.can.send(frame)?;

        let deadline = Instant::now() + self.reply_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.timeout_error());
            }

            match self.can.receive_timeout(remaining) {
                Ok(reply) if reply.id == reply_id && accept(&reply) => return Ok(reply),
                Ok(other) => {
                    trace!(
                        "Skipping frame ID=0x{:X} cmd=0x{:02X} while waiting for 0x{:X}",
                        other.id, other.data[0], reply_id
                    );
                },
                Err(CanError::Timeout) => return Err(self.timeout_error()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 丢弃上一次超时请求留下的迟到回复
    fn drain_stale_frames(&mut self) -> Result<(), DriverError> {
        for _ in 0..MAX_STALE_FRAMES {
            match self.can.try_receive()? {
                Some(stale) => warn!("Discarding stale frame ID=0x{:X}", stale.id),
                None => return Ok(()),
            }
        }
        Ok(())
    }

    fn timeout_error(&self) -> DriverError {
        DriverError::Timeout {
            node_id: self.node_id,
            timeout_ms: self.reply_timeout.as_millis() as u64,
        }
    }
}
