//! 差速驱动机器人

use crate::kinematics::DifferentialDrive;
use crate::odometry::{OdometryState, OdometryUpdater, PoseReader};
use crate::{OdometryError, Pose, Velocity};
use brick_driver::{BrickPi, DeviceError, DriveEncoders};
use brick_protocol::MotorPort;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 差速驱动机器人
///
/// 左右驱动电机端口、几何参数和里程计周期均来自 [`BrickPi`] 的配置。
/// 丢弃时先停止里程计线程，再停止电机。
pub struct Robot {
    brick: Arc<BrickPi>,
    kinematics: DifferentialDrive,
    left: MotorPort,
    right: MotorPort,
    odometry: OdometryUpdater,
}

impl Robot {
    /// 将驱动轮编码器清零（以当前读数作为偏移）并创建里程计
    pub fn new(brick: Arc<BrickPi>, init_pose: Pose) -> Result<Self, DeviceError> {
        let config = brick.config().clone();
        let (left, right) = (config.motors.left, config.motors.right);

        for port in [left, right] {
            let current = brick.get_motor_encoder(port)?;
            brick.offset_motor_encoder(port, current)?;
        }

        let kinematics = DifferentialDrive::from_config(&config.geometry);
        let odometry = OdometryUpdater::new(
            DriveEncoders::new(brick.clone()),
            kinematics,
            config.odometry.clone(),
            init_pose,
        );
        info!("Robot {} ready at {}", config.robot.id, init_pose);
        Ok(Self {
            brick,
            kinematics,
            left,
            right,
            odometry,
        })
    }

    pub fn brick(&self) -> &Arc<BrickPi> {
        &self.brick
    }

    pub fn kinematics(&self) -> &DifferentialDrive {
        &self.kinematics
    }

    /// 设置线速度 `v`（米/秒）与角速度 `w`（弧度/秒）
    pub fn set_speed(&self, v: f64, w: f64) -> Result<(), DeviceError> {
        let (left, right) = self.kinematics.wheel_speeds(Velocity::new(v, w));
        debug!("set_speed({:.3}, {:.3}) -> left {}, right {}", v, w, left, right);
        self.brick.set_motor_dps(self.left, left)?;
        self.brick.set_motor_dps(self.right, right)?;
        Ok(())
    }

    /// 最近一个里程计周期测得的 `(v, w)`
    pub fn read_speed(&self) -> Velocity {
        self.odometry.read_speed()
    }

    pub fn read_odometry(&self) -> Pose {
        self.odometry.read_pose()
    }

    pub fn start_odometry(&mut self) -> Result<(), OdometryError> {
        self.odometry.start()
    }

    pub fn stop_odometry(&mut self) -> Result<(), OdometryError> {
        self.odometry.stop()
    }

    pub fn odometry_state(&self) -> OdometryState {
        self.odometry.state()
    }

    pub fn odometry(&self) -> &OdometryUpdater {
        &self.odometry
    }

    pub fn pose_reader(&self) -> PoseReader {
        self.odometry.reader()
    }

    pub fn reset_odometry(&self, pose: Pose) {
        self.odometry.reset_pose(pose);
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        if let Err(e) = self.odometry.stop() {
            warn!("Failed to stop odometry: {}", e);
        }
        if let Err(e) = self.brick.set_motor_dps(self.left | self.right, 0.0) {
            warn!("Failed to halt drive motors: {}", e);
        }
    }
}
