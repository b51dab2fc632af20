//! run 命令
//!
//! 连接电机，运行正弦跟踪直到 Ctrl+C，然后关机

use anyhow::{Result, anyhow};
use clap::Args;
use rmd_client::config::RunConfig;
use rmd_client::control::{ControlLoop, RunReport, SystemClock};
use rmd_client::port::MockConnector;
use rmd_client::status::ConsoleSink;
use rmd_client::stop::StopToken;
use std::path::PathBuf;
use tracing::info;

use crate::config::load_config;

/// 正弦跟踪命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件路径（TOML，省略时使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 使用模拟电机（不需要 CAN 硬件）
    #[arg(long)]
    pub mock: bool,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => RunConfig::default(),
        };
        info!(
            "Run config: mode={:?}, interface={}, node={}",
            config.mode, config.actuator.interface, config.actuator.node_id
        );

        let stop = StopToken::new();
        let handler_token = stop.clone();
        ctrlc::set_handler(move || handler_token.request_stop())
            .map_err(|e| anyhow!("Failed to install Ctrl+C handler: {}", e))?;

        let control = ControlLoop::new(&config, SystemClock::new(), ConsoleSink)?;
        let report = if self.mock {
            control.run(&MockConnector, &stop)?
        } else {
            run_socketcan(control, &stop)?
        };

        info!(
            "Run finished: state={}, ticks={}, overruns={}",
            report.final_state, report.ticks, report.overruns
        );
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn run_socketcan(
    control: ControlLoop<SystemClock, ConsoleSink>,
    stop: &StopToken,
) -> Result<RunReport> {
    use rmd_client::port::SocketCanConnector;

    Ok(control.run(&SocketCanConnector::default(), stop)?)
}

#[cfg(not(target_os = "linux"))]
fn run_socketcan(
    _control: ControlLoop<SystemClock, ConsoleSink>,
    _stop: &StopToken,
) -> Result<RunReport> {
    anyhow::bail!("SocketCAN is only available on Linux; use --mock")
}
