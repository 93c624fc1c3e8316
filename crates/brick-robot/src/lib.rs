//! # Brick Robot
//!
//! 差速驱动机器人与周期性里程计。
//!
//! - [`Pose`] / [`Velocity`]: 位姿与速度
//! - [`DifferentialDrive`]: 正/逆运动学
//! - [`OdometryUpdater`]: 后台线程周期性读取编码器并积分位姿
//! - [`Robot`]: 组合 `BrickPi`、运动学与里程计

mod error;
pub mod kinematics;
pub mod odometry;
mod pose;
mod robot;

pub use error::OdometryError;
pub use kinematics::{DifferentialDrive, Displacement};
pub use odometry::{OdometryState, OdometryUpdater, PoseReader};
pub use pose::{Pose, Velocity};
pub use robot::Robot;
