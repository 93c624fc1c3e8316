//! 电机命令：以给定角速度转动电机并打印编码器

use anyhow::Result;
use brick_sdk::{MotorPort, PortMask};
use clap::Args;
use std::thread;
use std::time::Duration;

use crate::session::CliContext;

/// 电机命令参数
#[derive(Args, Debug)]
pub struct MotorsCommand {
    /// 电机端口（可重复，如 --port PORT_B --port PORT_C）
    #[arg(short, long = "port", default_values = ["PORT_B", "PORT_C"])]
    pub ports: Vec<MotorPort>,

    /// 目标角速度（度/秒）
    #[arg(short, long, default_value_t = 90.0, allow_negative_numbers = true)]
    pub dps: f64,

    /// 运行时长（秒）
    #[arg(short, long, default_value_t = 1.0)]
    pub seconds: f64,
}

impl MotorsCommand {
    pub fn mask(&self) -> PortMask<MotorPort> {
        self.ports.iter().fold(PortMask::empty(), |mask, port| mask | *port)
    }

    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let session = ctx.connect()?;
        let brick = &session.brick;
        let mask = self.mask();

        brick.reset_motor_encoder(mask)?;
        println!("🚀 {:?} → {} °/s，持续 {:.1} s", mask, self.dps, self.seconds);
        brick.set_motor_dps(mask, self.dps)?;
        thread::sleep(Duration::from_secs_f64(self.seconds.max(0.0)));
        brick.set_motor_dps(mask, 0.0)?;

        println!("📊 编码器:");
        for port in mask.iter() {
            println!("  {}: {:.1}°", port, brick.get_motor_encoder(port)?);
        }
        Ok(())
    }
}
