//! # RMD CLI
//!
//! Sine trajectory runner for a single MyActuator RMD servo.
//!
//! ```bash
//! # 默认配置：can2 上的 1 号电机，45° / 1 Hz，运控模式
//! rmd-cli run
//!
//! # 指定配置文件
//! rmd-cli run --config x6-60.toml
//!
//! # 无硬件演示
//! rmd-cli run --mock
//! ```
//!
//! 按 Ctrl+C 停止：循环在下一个 tick 边界退出并发送一次关机命令。
//! 正常停止或关机失败都以 0 退出；连接失败或运行中命令失败以 1 退出。

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::RunCommand;

/// RMD CLI - 电机正弦跟踪工具
#[derive(Parser, Debug)]
#[command(name = "rmd-cli")]
#[command(about = "Sine trajectory runner for MyActuator RMD servos", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行正弦跟踪（Ctrl+C 停止）
    Run {
        #[command(flatten)]
        args: RunCommand,
    },
}

const DEFAULT_LOG_FILTER: &str = "rmd_cli=info,rmd_client=info";

fn main() -> ExitCode {
    // 初始化日志（stdout 留给状态行）
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { args } => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // 各层错误消息已包含底层原因
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
