//! 仿真电机
//!
//! 每个电机对应场景中的一个关节（`{position}Motor{id}`）。
//! 编码器读数为关节角度（度）叠加与两次读数之差成比例的噪声。

use crate::DeviceError;
use brick_protocol::{Deg, DegPerSec, ObjectHandle, Rad};
use brick_tools::NoiseGenerator;
use brick_transport::SimSession;
use tracing::debug;

/// 电机在机器人上的位置，决定场景对象名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorRole {
    Left,
    Right,
    Claw,
}

impl MotorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MotorRole::Left => "left",
            MotorRole::Right => "right",
            MotorRole::Claw => "claw",
        }
    }

    /// 场景中的关节名（如 `leftMotor0`）
    pub fn object_name(self, robot_id: u32) -> String {
        format!("{}Motor{}", self.as_str(), robot_id)
    }
}

#[derive(Debug)]
pub struct Motor {
    role: MotorRole,
    joint: ObjectHandle,
    /// 上一次读数（度）
    last_read: Deg,
    encoder_std: f64,
    noise: NoiseGenerator,
}

impl Motor {
    /// 解析关节句柄并将目标速度清零
    pub fn attach(
        session: &mut SimSession,
        role: MotorRole,
        robot_id: u32,
        encoder_std: f64,
        noise: NoiseGenerator,
    ) -> Result<Self, DeviceError> {
        let joint = session.get_object_handle(&role.object_name(robot_id))?;
        session.set_joint_target_velocity(joint, 0.0)?;
        debug!("Attached {} motor to {}", role.as_str(), joint);
        Ok(Self {
            role,
            joint,
            last_read: Deg::ZERO,
            encoder_std,
            noise,
        })
    }

    pub fn role(&self) -> MotorRole {
        self.role
    }

    pub fn joint(&self) -> ObjectHandle {
        self.joint
    }

    /// 读取编码器（度）
    pub fn read(&mut self, session: &mut SimSession) -> Result<Deg, DeviceError> {
        let position = Rad(session.get_joint_position(self.joint)?).to_deg();
        let diff = position - self.last_read;
        self.last_read = position;
        Ok(position + diff * self.noise.gaussian(self.encoder_std))
    }

    /// 将编码器设置为 `value` 度
    pub fn set_encoder(&mut self, session: &mut SimSession, value: Deg) -> Result<(), DeviceError> {
        session.set_joint_position(self.joint, value.to_rad().value())?;
        self.last_read = value;
        Ok(())
    }

    pub fn set_dps(&mut self, session: &mut SimSession, dps: DegPerSec) -> Result<(), DeviceError> {
        session.set_joint_target_velocity(self.joint, dps.to_rad_per_sec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_transport::mock::MockSimulator;
    use std::time::Duration;

    fn session(sim: &MockSimulator) -> SimSession {
        SimSession::connect(sim.connector(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_attach_zeroes_velocity() {
        let sim = MockSimulator::with_robot_scene(0);
        let mut session = session(&sim);
        let motor =
            Motor::attach(&mut session, MotorRole::Left, 0, 0.0, NoiseGenerator::silent()).unwrap();
        assert_eq!(motor.role(), MotorRole::Left);
        assert_eq!(sim.joint_target_velocity("leftMotor0"), Some(0.0));
    }

    #[test]
    fn test_missing_joint_is_unavailable() {
        let sim = MockSimulator::with_robot_scene(0);
        let mut session = session(&sim);
        let err =
            Motor::attach(&mut session, MotorRole::Left, 7, 0.0, NoiseGenerator::silent()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_encoder_in_degrees() {
        let sim = MockSimulator::with_robot_scene(0);
        let mut session = session(&sim);
        let mut motor =
            Motor::attach(&mut session, MotorRole::Right, 0, 0.0, NoiseGenerator::silent()).unwrap();

        sim.set_joint_position("rightMotor0", std::f64::consts::PI);
        let deg = motor.read(&mut session).unwrap();
        assert!((deg.value() - 180.0).abs() < 1e-9);

        motor.set_encoder(&mut session, Deg(90.0)).unwrap();
        let rad = sim.joint_position("rightMotor0").unwrap();
        assert!((rad - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_set_dps_converts_to_radians() {
        let sim = MockSimulator::with_robot_scene(0);
        let mut session = session(&sim);
        let mut motor =
            Motor::attach(&mut session, MotorRole::Claw, 0, 0.0, NoiseGenerator::silent()).unwrap();
        motor.set_dps(&mut session, DegPerSec(180.0)).unwrap();
        let velocity = sim.joint_target_velocity("clawMotor0").unwrap();
        assert!((velocity - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_noise_scales_with_motion() {
        let sim = MockSimulator::with_robot_scene(0);
        let mut session = session(&sim);
        let mut motor =
            Motor::attach(&mut session, MotorRole::Left, 0, 0.025, NoiseGenerator::new(3)).unwrap();

        // 未移动时，噪声项为 0
        assert_eq!(motor.read(&mut session).unwrap().value(), 0.0);

        sim.set_joint_position("leftMotor0", 1.0);
        let deg = motor.read(&mut session).unwrap().value();
        let expected = 1.0f64.to_degrees();
        assert!((deg - expected).abs() < expected * 0.2, "deg = {}", deg);
    }
}
