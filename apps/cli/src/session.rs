//! 仿真会话
//!
//! 每个命令独立执行：
//! 1. 读取配置（`--config`，缺省使用默认值）
//! 2. 建立内存仿真场景并连接
//! 3. 执行操作
//! 4. 丢弃会话（停止电机、断开连接）

use anyhow::{Context, Result};
use brick_sdk::{BrickConfig, BrickPi, BrickPiBuilder};
use brick_transport::mock::MockSimulator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// 全局命令行选项
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    /// 配置文件路径
    pub config_path: Option<PathBuf>,
    /// 覆盖配置中的机器人编号
    pub robot_id: Option<u32>,
}

impl CliContext {
    /// 加载并校验配置
    pub fn load_config(&self) -> Result<BrickConfig> {
        let mut config = match &self.config_path {
            Some(path) => BrickConfig::load(path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => BrickConfig::default(),
        };
        if let Some(id) = self.robot_id {
            config.robot.id = id;
        }
        config.validate().context("配置校验失败")?;
        Ok(config)
    }

    /// 建立仿真场景并构造 BrickPi（启动仿真）
    pub fn connect(&self) -> Result<SimulatorSession> {
        let config = self.load_config()?;
        let sim = MockSimulator::with_robot_scene(config.robot.id);
        debug!("Mock scene created for robot {}", config.robot.id);

        println!("🔌 连接到仿真器（机器人 {}）...", config.robot.id);
        let brick = BrickPiBuilder::new(sim.connector())
            .config(config)
            .build()
            .context("连接仿真器失败")?;
        Ok(SimulatorSession {
            sim,
            brick: Arc::new(brick),
        })
    }
}

/// 已连接的仿真会话
pub struct SimulatorSession {
    /// 场景控制（设置障碍物距离等）
    pub sim: MockSimulator,
    pub brick: Arc<BrickPi>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_when_no_path() {
        let ctx = CliContext::default();
        assert_eq!(ctx.load_config().unwrap(), BrickConfig::default());
    }

    #[test]
    fn test_robot_id_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[robot]\nid = 4").unwrap();
        let ctx = CliContext {
            config_path: Some(file.path().to_path_buf()),
            robot_id: Some(9),
        };
        assert_eq!(ctx.load_config().unwrap().robot.id, 9);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[motors]\nleft = \"PORT_B\"\nright = \"PORT_B\"").unwrap();
        let ctx = CliContext {
            config_path: Some(file.path().to_path_buf()),
            robot_id: None,
        };
        assert!(ctx.load_config().is_err());
    }
}
