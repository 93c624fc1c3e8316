//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use brick_sdk::prelude::*;
//! ```

// 驱动层
pub use brick_driver::{BrickPi, BrickPiBuilder, DriveEncoders, EncoderSample, EncoderSource};

// 机器人层
pub use brick_robot::{
    DifferentialDrive, OdometryState, OdometryUpdater, Pose, PoseReader, Robot, Velocity,
};

// 相机
pub use brick_camera::{Camera, FrameBuffer, PixelFormat};

// 协议层：端口常量、单位、传感器
pub use brick_protocol::{
    Deg, DegPerSec, MotorPort, PORT_1, PORT_2, PORT_3, PORT_4, PORT_A, PORT_B, PORT_C, PORT_D,
    PortMask, Rad, SensorKind, SensorPort, SensorValue,
};

// 配置
pub use brick_tools::{BrickConfig, NoiseConfig, OdometryConfig};

// 传输
pub use brick_transport::{Connector, SimHandle};

// 错误类型
pub use brick_camera::CameraError;
pub use brick_driver::DeviceError;
pub use brick_robot::OdometryError;
pub use brick_tools::ConfigError;
pub use brick_transport::TransportError;

pub use std::sync::Arc;
