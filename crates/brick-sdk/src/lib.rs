//! Brick SDK - 仿真 BrickPi 机器人 Rust SDK
//!
//! 在机器人仿真器之上提供与 BrickPi 硬件库一致的接口：电机、传感器、
//! 相机，以及带锁保护的周期性里程计。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 端口、单位、传感器类型与仿真器请求/响应
//! - **传输层** (`transport`): 请求/响应传输与全局仿真会话锁
//! - **驱动层** (`driver`): BrickPi 门面、电机/传感器模型
//! - **相机** (`camera`): PiCamera 风格的图像采集
//! - **机器人层** (`robot`): 差速驱动运动学与里程计线程
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use brick_sdk::prelude::*;
//!
//! brick_sdk::init_logger!();
//! let brick = Arc::new(BrickPiBuilder::new(connector).config(BrickConfig::load("robot.toml")?).build()?);
//! let mut robot = Robot::new(brick, Pose::ORIGIN)?;
//! robot.start_odometry()?;
//! robot.set_speed(0.1, 0.0)?;
//! ```

pub use brick_camera as camera;
pub use brick_driver as driver;
pub use brick_protocol as protocol;
pub use brick_robot as robot;
pub use brick_tools as tools;
pub use brick_transport as transport;

pub mod prelude;

// --- 常用类型 ---

pub use brick_camera::{Camera, CameraError, FrameBuffer, PixelFormat};
pub use brick_driver::{BrickPi, BrickPiBuilder, DeviceError};
pub use brick_protocol::{MotorPort, PortMask, SensorKind, SensorPort, SensorValue};
pub use brick_robot::{OdometryError, OdometryState, Pose, Robot, Velocity};
pub use brick_tools::{BrickConfig, ConfigError};
pub use brick_transport::{Connector, SimHandle, TransportError};

// 供 `init_logger!` 宏使用
#[doc(hidden)]
pub use tracing_log as __tracing_log;
#[doc(hidden)]
pub use tracing_subscriber as __tracing_subscriber;

/// 初始化日志
///
/// 使用 `RUST_LOG` 环境变量过滤（默认 `info`），并将 `log` crate 的记录桥接到 `tracing`。
/// 重复调用是安全的：已有全局订阅者时静默忽略。
///
/// ```rust
/// brick_sdk::init_logger!();
/// brick_sdk::init_logger!("brick_robot=debug");
/// ```
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger!("info")
    };
    ($default:expr) => {{
        use $crate::__tracing_subscriber::{EnvFilter, fmt};
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new($default));
        let _ = fmt().with_env_filter(filter).try_init();
        // `log` 桥接（订阅者已安装桥接时返回错误，忽略）
        let _ = $crate::__tracing_log::LogTracer::init();
    }};
}
