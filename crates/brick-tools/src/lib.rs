//! # Brick Tools - 共享配置与噪声模型
//!
//! **依赖原则**: 只依赖 `brick-protocol`，不依赖传输层或驱动层
//!
//! ## 包含模块
//!
//! - `config` - 机器人/仿真配置（TOML）
//! - `noise` - 可复现的高斯噪声生成器

pub mod config;
pub mod noise;

// 重新导出常用类型
pub use config::{
    BrickConfig, CameraConfig, ConfigError, GeometryConfig, MotorConfig, NoiseConfig,
    OdometryConfig, RobotConfig, TransportConfig, UltrasonicConfig,
};
pub use noise::NoiseGenerator;
