//! 命令定义和实现

pub mod camera;
pub mod config;
pub mod motors;
pub mod odometry;
pub mod sensors;

pub use camera::CameraCommand;
pub use config::ConfigCommand;
pub use motors::MotorsCommand;
pub use odometry::OdometryCommand;
pub use sensors::{LightCommand, UltrasonicCommand};
