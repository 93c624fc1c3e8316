//! 传感器命令：在端口 1 配置传感器并周期性打印读数

use anyhow::Result;
use brick_sdk::SensorKind;
use brick_sdk::protocol::PORT_1;
use clap::Args;
use std::thread;
use std::time::Duration;

use crate::session::{CliContext, SimulatorSession};

/// 光线传感器命令参数
#[derive(Args, Debug)]
pub struct LightCommand {
    /// 读取次数
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: u32,

    /// 读取间隔（毫秒）
    #[arg(short, long, default_value_t = 200)]
    pub interval_ms: u64,
}

impl LightCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let session = ctx.connect()?;
        session.brick.set_sensor_type(PORT_1, SensorKind::NxtLightOn)?;
        sample(&session, self.count, self.interval_ms)
    }
}

/// 超声波传感器命令参数
#[derive(Args, Debug)]
pub struct UltrasonicCommand {
    /// 场景中障碍物距离（米）；省略表示未检测到物体
    #[arg(long)]
    pub distance: Option<f64>,

    /// 读取次数
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: u32,

    /// 读取间隔（毫秒）
    #[arg(short, long, default_value_t = 200)]
    pub interval_ms: u64,
}

impl UltrasonicCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let session = ctx.connect()?;
        let config = session.brick.config();
        let object = format!("{}ProximitySensor{}", config.ultrasonic.direction, config.robot.id);
        match self.distance {
            Some(d) => session.sim.set_proximity(&object, true, d),
            None => session.sim.set_proximity(&object, false, 0.0),
        }

        session.brick.set_sensor_type(PORT_1, SensorKind::NxtUltrasonic)?;
        sample(&session, self.count, self.interval_ms)
    }
}

fn sample(session: &SimulatorSession, count: u32, interval_ms: u64) -> Result<()> {
    let kind = session.brick.sensor_type(PORT_1);
    for i in 0..count {
        if i > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
        let value = session.brick.get_sensor(PORT_1)?;
        match kind {
            Some(kind) => println!("  [{}] {}: {}", i + 1, kind, value),
            None => println!("  [{}] {}", i + 1, value),
        }
    }
    Ok(())
}
