//! 配置管理命令

use anyhow::{Context, Result};
use brick_sdk::BrickConfig;
use clap::Subcommand;
use std::path::PathBuf;

use crate::session::CliContext;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（TOML）
    Show,

    /// 校验配置文件
    Check,

    /// 写出默认配置
    Init {
        /// 输出路径
        path: PathBuf,

        /// 覆盖已存在的文件
        #[arg(short, long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = ctx.load_config()?;
                print!("{}", config.to_toml_string()?);
            },
            ConfigCommand::Check => {
                let config = ctx.load_config()?;
                println!(
                    "✅ 配置有效（机器人 {}，左 {}，右 {}）",
                    config.robot.id, config.motors.left, config.motors.right
                );
            },
            ConfigCommand::Init { path, force } => {
                if path.exists() && !force {
                    anyhow::bail!("{} 已存在（使用 --force 覆盖）", path.display());
                }
                BrickConfig::default()
                    .save(path)
                    .with_context(|| format!("写入配置失败: {}", path.display()))?;
                println!("✅ 已写入 {}", path.display());
            },
        }
        Ok(())
    }
}
