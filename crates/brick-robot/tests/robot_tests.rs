//! 机器人集成测试（内存仿真器）

use brick_driver::{BrickPi, BrickPiBuilder, DeviceError};
use brick_protocol::{PORT_B, PORT_C};
use brick_robot::{OdometryError, OdometryState, Pose, Robot};
use brick_tools::{BrickConfig, NoiseConfig};
use brick_transport::mock::MockSimulator;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const R: f64 = 0.028;

fn quiet_config(period_ms: u64) -> BrickConfig {
    let mut config = BrickConfig::default();
    config.noise = NoiseConfig::disabled();
    config.transport.startup_settle_ms = 0;
    config.odometry.period_ms = period_ms;
    config
}

fn brick(sim: &MockSimulator, config: BrickConfig) -> Arc<BrickPi> {
    Arc::new(BrickPiBuilder::new(sim.connector()).config(config).build().unwrap())
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn test_new_zeroes_drive_encoders() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = brick(&sim, quiet_config(20));
    sim.set_joint_position("leftMotor0", 1.5);
    sim.set_joint_position("rightMotor0", -0.5);

    let robot = Robot::new(brick.clone(), Pose::ORIGIN).unwrap();
    assert!(brick.get_motor_encoder(PORT_B).unwrap().abs() < 1e-9);
    assert!(brick.get_motor_encoder(PORT_C).unwrap().abs() < 1e-9);
    assert_eq!(robot.read_odometry(), Pose::ORIGIN);
    assert_eq!(robot.odometry_state(), OdometryState::Stopped);
}

#[test]
fn test_set_speed_drives_both_wheels() {
    let sim = MockSimulator::with_robot_scene(0);
    let robot = Robot::new(brick(&sim, quiet_config(20)), Pose::ORIGIN).unwrap();

    robot.set_speed(0.1, 0.0).unwrap();
    let left = sim.joint_target_velocity("leftMotor0").unwrap();
    let right = sim.joint_target_velocity("rightMotor0").unwrap();
    assert!((left - 0.1 / R).abs() < 1e-9);
    assert!((right - 0.1 / R).abs() < 1e-9);

    // 原地左转：右轮正转、左轮反转
    robot.set_speed(0.0, 1.0).unwrap();
    let left = sim.joint_target_velocity("leftMotor0").unwrap();
    let right = sim.joint_target_velocity("rightMotor0").unwrap();
    assert!(right > 0.0);
    assert!((left + right).abs() < 1e-9);
}

#[test]
fn test_odometry_tracks_straight_motion() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut robot = Robot::new(brick(&sim, quiet_config(20)), Pose::ORIGIN).unwrap();

    robot.start_odometry().unwrap();
    robot.set_speed(0.1, 0.0).unwrap();
    assert!(wait_until(Duration::from_secs(2), || robot.read_odometry().x > 0.02));

    let speed = robot.read_speed();
    assert!((speed.v - 0.1).abs() < 0.03, "measured v = {}", speed.v);
    assert!(speed.w.abs() < 0.05);

    robot.stop_odometry().unwrap();
    let pose = robot.read_odometry();
    // 左右轮分两次读取，允许微小的航向误差
    assert!(pose.y.abs() < 1e-3);
    assert!(pose.heading.abs() < 1e-2);
    assert!(robot.odometry().last_error().is_none());
}

#[test]
fn test_pose_reader_follows_reset() {
    let sim = MockSimulator::with_robot_scene(0);
    let robot = Robot::new(brick(&sim, quiet_config(20)), Pose::new(1.0, 1.0, 0.0)).unwrap();
    let reader = robot.pose_reader();
    assert_eq!(reader.read_pose(), Pose::new(1.0, 1.0, 0.0));

    robot.reset_odometry(Pose::new(-2.0, 0.5, 1.0));
    assert_eq!(reader.read_pose(), Pose::new(-2.0, 0.5, 1.0));
    assert!(!reader.is_running());
}

#[test]
fn test_lost_simulator_stops_odometry() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut robot = Robot::new(brick(&sim, quiet_config(10)), Pose::ORIGIN).unwrap();
    robot.start_odometry().unwrap();
    assert!(wait_until(Duration::from_secs(2), || robot.odometry().ticks() >= 1));

    sim.set_unreachable(true);
    assert!(wait_until(Duration::from_secs(2), || robot.odometry_state() == OdometryState::Stopped));

    let err = robot.odometry().last_error().unwrap();
    match err.as_ref() {
        OdometryError::Device { source, .. } => assert!(source.is_unavailable()),
        other => panic!("Expected Device error, got {:?}", other),
    }
    assert!(matches!(
        robot.set_speed(0.1, 0.0),
        Err(DeviceError::Unavailable(_))
    ));
}

#[test]
fn test_drop_halts_motors() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut robot = Robot::new(brick(&sim, quiet_config(20)), Pose::ORIGIN).unwrap();
    robot.start_odometry().unwrap();
    robot.set_speed(0.05, 0.5).unwrap();
    assert_ne!(sim.joint_target_velocity("leftMotor0"), Some(0.0));

    drop(robot);
    assert_eq!(sim.joint_target_velocity("leftMotor0"), Some(0.0));
    assert_eq!(sim.joint_target_velocity("rightMotor0"), Some(0.0));
}
