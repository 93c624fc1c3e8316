//! 里程计命令：以给定速度行驶并打印/记录位姿

use anyhow::{Context, Result};
use brick_sdk::{Pose, Robot, Velocity};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::session::CliContext;

/// 里程计命令参数
#[derive(Args, Debug)]
pub struct OdometryCommand {
    /// 线速度（米/秒）
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    pub v: f64,

    /// 角速度（弧度/秒）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub w: f64,

    /// 行驶时长（秒）
    #[arg(short, long, default_value_t = 2.0)]
    pub seconds: f64,

    /// 打印间隔（毫秒）
    #[arg(short, long, default_value_t = 250)]
    pub interval_ms: u64,

    /// 位姿日志（JSON Lines）
    #[arg(short, long)]
    pub log: Option<PathBuf>,
}

/// 位姿日志中的一行
#[derive(Debug, Serialize)]
pub struct PoseRecord {
    /// 自启动以来的秒数
    pub t: f64,
    #[serde(flatten)]
    pub pose: Pose,
    pub speed: Velocity,
}

impl OdometryCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
            println!("\n收到退出信号，正在停止...");
        })?;

        let session = ctx.connect()?;
        let mut robot = Robot::new(session.brick.clone(), Pose::ORIGIN)?;
        let mut log = match &self.log {
            Some(path) => Some(BufWriter::new(
                File::create(path).with_context(|| format!("创建日志失败: {}", path.display()))?,
            )),
            None => None,
        };

        robot.start_odometry()?;
        robot.set_speed(self.v, self.w)?;
        println!("🚗 v = {} m/s, w = {} rad/s（Ctrl+C 停止）", self.v, self.w);

        let begin = Instant::now();
        let deadline = Duration::from_secs_f64(self.seconds.max(0.0));
        let interval = Duration::from_millis(self.interval_ms.max(1));
        while running.load(Ordering::SeqCst) && begin.elapsed() < deadline {
            thread::sleep(interval);
            if !robot.odometry().is_running() {
                warn!("Odometry stopped unexpectedly");
                break;
            }
            let record = PoseRecord {
                t: begin.elapsed().as_secs_f64(),
                pose: robot.read_odometry(),
                speed: robot.read_speed(),
            };
            println!("  t = {:5.2} s  {}", record.t, record.pose);
            if let Some(log) = log.as_mut() {
                serde_json::to_writer(&mut *log, &record)?;
                log.write_all(b"\n")?;
            }
        }

        robot.set_speed(0.0, 0.0)?;
        robot.stop_odometry()?;
        if let Some(mut log) = log {
            log.flush()?;
        }
        if let Some(err) = robot.odometry().last_error() {
            anyhow::bail!("里程计异常停止: {}", err);
        }
        println!("📍 最终位姿: {}", robot.read_odometry());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_record_is_flat_json() {
        let record = PoseRecord {
            t: 0.5,
            pose: Pose::new(1.0, 2.0, 0.25),
            speed: Velocity::new(0.1, 0.0),
        };
        let value: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["t"], 0.5);
        assert_eq!(value["x"], 1.0);
        assert_eq!(value["heading"], 0.25);
        assert_eq!(value["speed"]["v"], 0.1);
    }
}
