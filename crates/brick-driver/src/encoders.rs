//! 里程计使用的编码器读取接口

use crate::{BrickPi, DeviceError};
use brick_protocol::{Deg, MotorPort};
use std::sync::Arc;

/// 左右驱动轮编码器的一次读数（度，自上次清零以来的累计值）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EncoderSample {
    pub left: Deg,
    pub right: Deg,
}

/// 编码器数据源
///
/// 里程计线程通过该接口读取编码器，测试中可以替换为脚本化的实现。
pub trait EncoderSource: Send + 'static {
    fn read_encoders(&mut self) -> Result<EncoderSample, DeviceError>;
}

/// 通过 [`BrickPi`] 读取配置中的左右驱动电机
#[derive(Debug, Clone)]
pub struct DriveEncoders {
    brick: Arc<BrickPi>,
    left: MotorPort,
    right: MotorPort,
}

impl DriveEncoders {
    pub fn new(brick: Arc<BrickPi>) -> Self {
        let left = brick.config().motors.left;
        let right = brick.config().motors.right;
        Self { brick, left, right }
    }

    pub fn ports(&self) -> (MotorPort, MotorPort) {
        (self.left, self.right)
    }
}

impl EncoderSource for DriveEncoders {
    fn read_encoders(&mut self) -> Result<EncoderSample, DeviceError> {
        // 两个读数在同一次加锁内完成
        let [left, right] = self.brick.get_motor_encoders([self.left, self.right])?;
        Ok(EncoderSample {
            left: Deg(left),
            right: Deg(right),
        })
    }
}

impl<F> EncoderSource for F
where
    F: FnMut() -> Result<EncoderSample, DeviceError> + Send + 'static,
{
    fn read_encoders(&mut self) -> Result<EncoderSample, DeviceError> {
        self()
    }
}
