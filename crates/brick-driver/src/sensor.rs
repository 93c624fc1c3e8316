//! 仿真传感器
//!
//! 每种 [`SensorKind`] 对应一个实现了 [`Sensor`] trait 的类型，
//! 由 [`create_sensor`] 统一构造。读数模型：
//!
//! | 类型 | 场景对象 | 读数 |
//! |------|----------|------|
//! | 触碰 | 无 | 恒为 0 |
//! | 超声波 | `{dir}ProximitySensor{id}` | 未检测到返回 100000，否则 `d·100 + N(0, d)`（厘米） |
//! | 光线 | `visionLight{id}` | `4000·(1 − c/255)`，`c` 为灰度图第一个像素 |
//! | 陀螺仪 | 左右电机关节 | `[2370 + w/4 + 漂移, 0]` |

use crate::DeviceError;
use crate::motor::MotorRole;
use brick_protocol::{ObjectHandle, SensorKind, SensorValue};
use brick_tools::{GeometryConfig, NoiseGenerator};
use brick_transport::SimSession;
use std::fmt;
use tracing::trace;

/// 超声波未检测到障碍物时返回的哨兵值（厘米）
pub const ULTRASONIC_NOTHING_DETECTED: f64 = 100_000.0;

/// 陀螺仪零点原始值
pub const GYRO_DEFAULT: f64 = 2370.0;

/// 陀螺仪原始值与 °/s 的比例
pub const GYRO_TO_DEG: f64 = 0.25;

/// 传感器公共接口
pub trait Sensor: Send + fmt::Debug {
    fn kind(&self) -> SensorKind;

    /// 读取一次传感器（调用方已持有全局传输锁）
    fn read(&mut self, session: &mut SimSession) -> Result<SensorValue, DeviceError>;
}

/// 构造传感器所需的上下文
#[derive(Debug, Clone)]
pub struct SensorContext<'a> {
    pub robot_id: u32,
    /// 超声波朝向（对象名前缀）
    pub direction: &'a str,
    pub geometry: &'a GeometryConfig,
}

/// 根据类型构造传感器并解析其场景对象
pub fn create_sensor(
    kind: SensorKind,
    session: &mut SimSession,
    ctx: &SensorContext<'_>,
    noise: NoiseGenerator,
) -> Result<Box<dyn Sensor>, DeviceError> {
    let sensor: Box<dyn Sensor> = match kind {
        SensorKind::Touch => Box::new(TouchSensor),
        SensorKind::NxtUltrasonic | SensorKind::Ev3UltrasonicCm => {
            let name = format!("{}ProximitySensor{}", ctx.direction, ctx.robot_id);
            Box::new(UltrasonicSensor {
                kind,
                handle: session.get_object_handle(&name)?,
                noise,
            })
        },
        SensorKind::NxtLightOn | SensorKind::NxtLightOff => {
            let name = format!("visionLight{}", ctx.robot_id);
            Box::new(LightSensor {
                kind,
                handle: session.get_object_handle(&name)?,
            })
        },
        SensorKind::Custom => Box::new(GyroSensor {
            left: session.get_object_handle(&MotorRole::Left.object_name(ctx.robot_id))?,
            right: session.get_object_handle(&MotorRole::Right.object_name(ctx.robot_id))?,
            wheel_radius: ctx.geometry.wheel_radius,
            wheel_separation: ctx.geometry.wheel_separation,
            drift: 0.0,
            noise,
        }),
    };
    Ok(sensor)
}

/// 触碰传感器（仿真中未实现）
#[derive(Debug)]
pub struct TouchSensor;

impl Sensor for TouchSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Touch
    }

    fn read(&mut self, _session: &mut SimSession) -> Result<SensorValue, DeviceError> {
        Ok(SensorValue::Scalar(0.0))
    }
}

#[derive(Debug)]
pub struct UltrasonicSensor {
    kind: SensorKind,
    handle: ObjectHandle,
    noise: NoiseGenerator,
}

impl Sensor for UltrasonicSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn read(&mut self, session: &mut SimSession) -> Result<SensorValue, DeviceError> {
        let (detected, distance) = session.check_proximity_sensor(self.handle)?;
        if !detected {
            return Ok(SensorValue::Scalar(ULTRASONIC_NOTHING_DETECTED));
        }
        // 每米 1 cm 的标准差
        let cm = ultrasonic_cm(distance, self.noise.gaussian(distance));
        trace!("Ultrasonic {}: {:.3} m -> {:.1} cm", self.handle, distance, cm);
        Ok(SensorValue::Scalar(cm))
    }
}

/// 检测距离（米）加噪声后的读数（厘米），不小于 0
fn ultrasonic_cm(distance: f64, noise: f64) -> f64 {
    (distance * 100.0 + noise).max(0.0)
}

#[derive(Debug)]
pub struct LightSensor {
    kind: SensorKind,
    handle: ObjectHandle,
}

impl Sensor for LightSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    /// 4000（全黑）到 0（全亮）
    fn read(&mut self, session: &mut SimSession) -> Result<SensorValue, DeviceError> {
        let image = session.get_vision_sensor_image(self.handle, true)?;
        let color = image.data.first().copied().ok_or(DeviceError::UnexpectedReply(
            brick_protocol::ProtocolError::InvalidImage {
                expected: 1,
                actual: 0,
            },
        ))?;
        Ok(SensorValue::Scalar(4000.0 * (1.0 - color as f64 / 255.0)))
    }
}

/// 陀螺仪（`SensorKind::Custom`）
///
/// 由左右轮目标速度推算角速度，并叠加随机游走漂移。
#[derive(Debug)]
pub struct GyroSensor {
    left: ObjectHandle,
    right: ObjectHandle,
    wheel_radius: f64,
    wheel_separation: f64,
    drift: f64,
    noise: NoiseGenerator,
}

impl Sensor for GyroSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Custom
    }

    fn read(&mut self, session: &mut SimSession) -> Result<SensorValue, DeviceError> {
        let w_right = session.get_joint_target_velocity(self.right)?;
        let w_left = session.get_joint_target_velocity(self.left)?;
        let w = ((w_right - w_left) * self.wheel_radius / self.wheel_separation).to_degrees();

        self.drift += self.noise.gaussian(1.0);
        let raw = GYRO_DEFAULT + w * GYRO_TO_DEG + self.drift;
        Ok(SensorValue::List(vec![raw, 0.0]))
    }
}
