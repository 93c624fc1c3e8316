//! # 配置
//!
//! 机器人与仿真桥的全部可调参数，从 TOML 文件加载。
//! 所有字段都有默认值，配置文件只需写出需要覆盖的部分：
//!
//! ```toml
//! [robot]
//! id = 0
//!
//! [motors]
//! left = "PORT_B"
//! right = "PORT_C"
//!
//! [ultrasonic]
//! alt_port = "PORT_2"
//! alt_direction = "left"
//!
//! [geometry]
//! wheel_radius = 0.028
//! wheel_separation = 0.118
//! ```

use brick_protocol::{MotorPort, SensorPort};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickConfig {
    pub robot: RobotConfig,
    pub motors: MotorConfig,
    pub ultrasonic: UltrasonicConfig,
    pub camera: CameraConfig,
    pub geometry: GeometryConfig,
    pub transport: TransportConfig,
    pub odometry: OdometryConfig,
    pub noise: NoiseConfig,
}

/// 机器人标识
///
/// 仿真场景中的对象名称以机器人编号结尾（如 `leftMotor0`）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub id: u32,
}

/// 电机与端口的对应关系
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub left: MotorPort,
    pub right: MotorPort,
    /// 爪子电机（可选）
    pub claw: Option<MotorPort>,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            left: MotorPort::B,
            right: MotorPort::C,
            claw: None,
        }
    }
}

/// 第二个超声波传感器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UltrasonicConfig {
    /// 默认朝向（对象名前缀，如 "front"）
    pub direction: String,
    /// 使用备用朝向的端口
    pub alt_port: Option<SensorPort>,
    /// 备用朝向（如 "left"）
    pub alt_direction: String,
}

impl Default for UltrasonicConfig {
    fn default() -> Self {
        Self {
            direction: "front".to_string(),
            alt_port: None,
            alt_direction: "left".to_string(),
        }
    }
}

/// 相机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// 是否旋转 180°（上下 + 左右翻转）
    pub reverse: bool,
    /// 输出分辨率（与传感器原始分辨率无关）
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            reverse: false,
            width: 512,
            height: 512,
        }
    }
}

/// 机器人几何参数（米）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub wheel_radius: f64,
    pub wheel_separation: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wheel_radius: 0.028,
            wheel_separation: 0.118,
        }
    }
}

/// 传输配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// 单次调用超时（毫秒）
    pub call_timeout_ms: u64,
    /// 启动仿真后的等待时间（毫秒）
    pub startup_settle_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 2_000,
            startup_settle_ms: 500,
        }
    }
}

impl TransportConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn startup_settle(&self) -> Duration {
        Duration::from_millis(self.startup_settle_ms)
    }
}

/// 里程计配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdometryConfig {
    /// 更新周期（毫秒）
    pub period_ms: u64,
    /// 允许的连续读取失败次数；超过后更新线程停止（0 = 首次失败即停止）
    pub max_consecutive_failures: u32,
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            period_ms: 1_000,
            max_consecutive_failures: 0,
        }
    }
}

impl OdometryConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// 传感器噪声配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// 随机种子（0 = 使用系统熵）
    pub seed: u64,
    /// 编码器噪声标准差（乘以两次读数之差）
    pub encoder_std: f64,
    /// 是否启用超声波与陀螺仪噪声
    pub sensors: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            encoder_std: 0.025,
            sensors: true,
        }
    }
}

impl NoiseConfig {
    /// 关闭全部噪声（测试用）
    pub fn disabled() -> Self {
        Self {
            seed: 1,
            encoder_std: 0.0,
            sensors: false,
        }
    }
}

impl BrickConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BrickConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验参数之间的一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motors.left == self.motors.right {
            return Err(ConfigError::Invalid(format!(
                "left and right motors share {}",
                self.motors.left
            )));
        }
        if let Some(claw) = self.motors.claw
            && (claw == self.motors.left || claw == self.motors.right)
        {
            return Err(ConfigError::Invalid(format!(
                "claw motor shares {} with a drive motor",
                claw
            )));
        }
        if !(self.geometry.wheel_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "wheel_radius must be > 0 (got {})",
                self.geometry.wheel_radius
            )));
        }
        if !(self.geometry.wheel_separation > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "wheel_separation must be > 0 (got {})",
                self.geometry.wheel_separation
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "camera resolution must be non-zero (got {}x{})",
                self.camera.width, self.camera.height
            )));
        }
        if !(self.noise.encoder_std >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "noise.encoder_std must be >= 0 (got {})",
                self.noise.encoder_std
            )));
        }
        Ok(())
    }
}
