//! # Brick Driver
//!
//! BrickPi3 兼容的设备门面，底层由仿真器会话驱动。
//!
//! - [`BrickPi`]: 电机/传感器操作，全部经由同一把全局传输锁串行化
//! - [`Sensor`]: 传感器多态接口（触碰、超声波、光线、陀螺仪）
//! - [`EncoderSource`]: 里程计读取编码器的接口
//!
//! # 示例
//!
//! ```rust,ignore
//! use brick_driver::BrickPiBuilder;
//! use brick_protocol::{PORT_B, PORT_C, PORT_1, SensorKind};
//! use brick_transport::mock::MockSimulator;
//!
//! let sim = MockSimulator::with_robot_scene(0);
//! let brick = BrickPiBuilder::new(sim.connector()).build()?;
//! brick.set_motor_dps(PORT_B | PORT_C, 90.0)?;
//! brick.set_sensor_type(PORT_1, SensorKind::NxtUltrasonic)?;
//! let distance = brick.get_sensor(PORT_1)?;
//! ```

mod brickpi;
mod builder;
mod encoders;
mod error;
pub mod motor;
pub mod sensor;

pub use brickpi::BrickPi;
pub use builder::BrickPiBuilder;
pub use encoders::{DriveEncoders, EncoderSample, EncoderSource};
pub use error::DeviceError;
pub use motor::{Motor, MotorRole};
pub use sensor::{Sensor, SensorContext};
