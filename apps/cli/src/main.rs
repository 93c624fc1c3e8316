//! # Brick CLI
//!
//! 仿真 BrickPi 机器人的命令行演示工具。每个命令独立执行：
//! 加载配置 → 建立内存仿真场景 → 执行操作 → 停止并断开。
//!
//! ```bash
//! # 写出默认配置并修改
//! brick-cli config init robot.toml
//!
//! # 转动左右电机 2 秒
//! brick-cli --config robot.toml motors --dps 180 --seconds 2
//!
//! # 行驶并记录位姿
//! brick-cli odometry --v 0.1 --w 0.5 --seconds 5 --log poses.jsonl
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod session;

use commands::{
    CameraCommand, ConfigCommand, LightCommand, MotorsCommand, OdometryCommand, UltrasonicCommand,
};
use session::CliContext;

/// Brick CLI - 仿真机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "brick-cli")]
#[command(about = "Command-line demo for the simulated BrickPi robot", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（TOML）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的机器人编号
    #[arg(long, global = true)]
    robot_id: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 转动电机并读取编码器
    Motors {
        #[command(flatten)]
        args: MotorsCommand,
    },

    /// 读取光线传感器
    Light {
        #[command(flatten)]
        args: LightCommand,
    },

    /// 读取超声波传感器
    Ultrasonic {
        #[command(flatten)]
        args: UltrasonicCommand,
    },

    /// 采集相机图像
    Camera {
        #[command(flatten)]
        args: CameraCommand,
    },

    /// 行驶并跟踪里程计
    Odometry {
        #[command(flatten)]
        args: OdometryCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("brick_cli=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = CliContext {
        config_path: cli.config,
        robot_id: cli.robot_id,
    };

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&ctx),
        Commands::Motors { args } => args.execute(&ctx),
        Commands::Light { args } => args.execute(&ctx),
        Commands::Ultrasonic { args } => args.execute(&ctx),
        Commands::Camera { args } => args.execute(&ctx),
        Commands::Odometry { args } => args.execute(&ctx),
    }
}
