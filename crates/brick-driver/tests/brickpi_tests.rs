//! BrickPi 门面集成测试（使用内存仿真器）

use brick_driver::{BrickPi, BrickPiBuilder, DeviceError, DriveEncoders, EncoderSource};
use brick_protocol::{
    MotorPort, PORT_1, PORT_2, PORT_3, PORT_A, PORT_B, PORT_C, PORT_D, PortMask, SensorKind,
    SensorValue, SimRequest,
};
use brick_tools::{BrickConfig, NoiseConfig};
use brick_transport::mock::MockSimulator;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn quiet_config() -> BrickConfig {
    let mut config = BrickConfig::default();
    config.noise = NoiseConfig::disabled();
    config.transport.startup_settle_ms = 0;
    config.motors.claw = Some(MotorPort::A);
    config
}

fn build(sim: &MockSimulator, config: BrickConfig) -> BrickPi {
    BrickPiBuilder::new(sim.connector()).config(config).build().unwrap()
}

#[test]
fn test_build_starts_simulation_asynchronously() {
    let sim = MockSimulator::with_robot_scene(0);
    let _brick = build(&sim, quiet_config());

    assert!(sim.is_running());
    assert!(!sim.is_synchronous());
    let calls = sim.calls();
    let sync = calls
        .iter()
        .position(|c| matches!(c, SimRequest::SetSynchronous { enabled: false }))
        .unwrap();
    let start = calls
        .iter()
        .position(|c| matches!(c, SimRequest::StartSimulation))
        .unwrap();
    assert!(sync < start);
}

#[test]
fn test_build_without_start() {
    let sim = MockSimulator::with_robot_scene(0);
    let _brick = BrickPiBuilder::new(sim.connector())
        .config(quiet_config())
        .start_simulation(false)
        .build()
        .unwrap();
    assert!(!sim.is_running());
}

#[test]
fn test_build_fails_when_simulator_down() {
    let sim = MockSimulator::with_robot_scene(0);
    sim.set_unreachable(true);
    let err = BrickPiBuilder::new(sim.connector())
        .config(quiet_config())
        .build()
        .unwrap_err();
    assert!(err.is_unavailable());
}

#[test]
fn test_build_rejects_invalid_config() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut config = quiet_config();
    config.motors.right = config.motors.left;
    let err = BrickPiBuilder::new(sim.connector()).config(config).build().unwrap_err();
    assert!(matches!(err, DeviceError::Config(_)));
}

#[test]
fn test_set_motor_dps_for_each_port_in_mask() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());

    brick.set_motor_dps(PORT_B | PORT_C, 90.0).unwrap();
    let expected = 90f64.to_radians();
    assert!((sim.joint_target_velocity("leftMotor0").unwrap() - expected).abs() < 1e-12);
    assert!((sim.joint_target_velocity("rightMotor0").unwrap() - expected).abs() < 1e-12);
    assert_eq!(sim.joint_target_velocity("clawMotor0"), Some(0.0));

    brick.set_motor_dps(PORT_A, -45.0).unwrap();
    assert!((sim.joint_target_velocity("clawMotor0").unwrap() + 45f64.to_radians()).abs() < 1e-12);
}

#[test]
fn test_unconfigured_motor_port_applies_nothing() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());

    let err = brick.set_motor_dps(PORT_B | PORT_D, 90.0).unwrap_err();
    assert!(matches!(err, DeviceError::PortNotConfigured { port: "PORT_D" }));
    assert!(err.is_bad_argument());
    assert_eq!(sim.joint_target_velocity("leftMotor0"), Some(0.0));
}

#[test]
fn test_raw_mask_with_high_bits_is_rejected() {
    let result: Result<PortMask<MotorPort>, DeviceError> =
        PortMask::from_bits(0x12).map_err(DeviceError::from);
    let err = result.unwrap_err();
    assert!(matches!(err, DeviceError::InvalidPort(_)));
    assert!(!err.is_unavailable());
}

#[test]
fn test_encoder_reset_and_offset() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());

    sim.set_joint_position("leftMotor0", std::f64::consts::PI);
    assert!((brick.get_motor_encoder(PORT_B).unwrap() - 180.0).abs() < 1e-9);

    brick.offset_motor_encoder(PORT_B, 30.0).unwrap();
    assert!((brick.get_motor_encoder(PORT_B).unwrap() - 150.0).abs() < 1e-9);

    brick.reset_motor_encoder(PORT_B | PORT_C).unwrap();
    assert!(brick.get_motor_encoder(PORT_B).unwrap().abs() < 1e-9);
    assert!(brick.get_motor_encoder(PORT_C).unwrap().abs() < 1e-9);
    assert!(sim.joint_position("leftMotor0").unwrap().abs() < 1e-12);
}

#[test]
fn test_get_motor_encoder_unconfigured() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());
    assert!(matches!(
        brick.get_motor_encoder(PORT_D),
        Err(DeviceError::PortNotConfigured { .. })
    ));
}

#[test]
fn test_sensor_dispatch() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());

    assert!(matches!(
        brick.get_sensor(PORT_1),
        Err(DeviceError::PortNotConfigured { port: "PORT_1" })
    ));

    brick.set_sensor_type(PORT_1, SensorKind::Touch).unwrap();
    brick.set_sensor_type(PORT_2, SensorKind::NxtUltrasonic).unwrap();
    brick.set_sensor_type(PORT_3, SensorKind::NxtLightOn).unwrap();
    assert_eq!(brick.sensor_type(PORT_2), Some(SensorKind::NxtUltrasonic));

    assert_eq!(brick.get_sensor(PORT_1).unwrap(), SensorValue::Scalar(0.0));

    sim.set_proximity("frontProximitySensor0", false, 0.0);
    assert_eq!(brick.get_sensor(PORT_2).unwrap(), SensorValue::Scalar(100_000.0));

    // visionLight0 默认为灰度 128
    let light = brick.get_sensor(PORT_3).unwrap().as_scalar().unwrap();
    assert!((light - 4000.0 * (1.0 - 128.0 / 255.0)).abs() < 1e-9);

    // 重新设置类型会替换原传感器
    brick.set_sensor_type(PORT_1, SensorKind::Custom).unwrap();
    assert_eq!(brick.get_sensor(PORT_1).unwrap().as_list().unwrap().len(), 2);
}

#[test]
fn test_alt_ultrasonic_port_uses_alt_direction() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut config = quiet_config();
    config.ultrasonic.alt_port = Some(PORT_2);
    let brick = build(&sim, config);

    brick
        .set_sensor_type(PORT_1 | PORT_2, SensorKind::Ev3UltrasonicCm)
        .unwrap();
    sim.set_proximity("frontProximitySensor0", true, 0.5);
    sim.set_proximity("leftProximitySensor0", true, 0.2);

    let front = brick.get_sensor(PORT_1).unwrap().as_scalar().unwrap();
    let left = brick.get_sensor(PORT_2).unwrap().as_scalar().unwrap();
    assert!((front - 50.0).abs() < 1e-9);
    assert!((left - 20.0).abs() < 1e-9);
}

#[test]
fn test_reset_all_then_reconnect() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());
    brick.set_motor_dps(PORT_B, 90.0).unwrap();

    brick.reset_all().unwrap();
    assert!(!sim.is_running());
    assert_eq!(sim.joint_target_velocity("leftMotor0"), Some(0.0));

    let err = brick.get_motor_encoder(PORT_B).unwrap_err();
    assert!(err.is_unavailable());
    assert!(!err.is_bad_argument());

    brick.reconnect().unwrap();
    brick.start_simulation().unwrap();
    assert!(sim.is_running());
    assert!(brick.get_motor_encoder(PORT_B).is_ok());
}

#[test]
fn test_lost_connection_is_unavailable() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = build(&sim, quiet_config());
    sim.set_unreachable(true);
    assert!(brick.get_motor_encoder(PORT_C).unwrap_err().is_unavailable());
    assert!(brick.set_motor_dps(PORT_C, 10.0).unwrap_err().is_unavailable());
}

#[test]
fn test_timeout_is_unavailable() {
    let sim = MockSimulator::with_robot_scene(0);
    let mut config = quiet_config();
    config.transport.call_timeout_ms = 10;
    let brick = build(&sim, config);

    sim.set_latency(Duration::from_millis(50));
    let err = brick.get_motor_encoder(PORT_B).unwrap_err();
    assert!(err.is_unavailable());
    assert!(format!("{}", err).contains("timed out"));
}

#[test]
fn test_concurrent_callers_are_serialized() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = Arc::new(build(&sim, quiet_config()));
    brick.set_sensor_type(PORT_1, SensorKind::NxtUltrasonic).unwrap();
    sim.set_latency(Duration::from_millis(1));

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let brick = brick.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    if i % 2 == 0 {
                        brick.get_motor_encoder(PORT_B).unwrap();
                    } else {
                        brick.get_sensor(PORT_1).unwrap();
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(sim.max_in_flight(), 1);
}

#[test]
fn test_drive_encoders_read_both_wheels() {
    let sim = MockSimulator::with_robot_scene(0);
    let brick = Arc::new(build(&sim, quiet_config()));
    let mut encoders = DriveEncoders::new(brick.clone());
    assert_eq!(encoders.ports(), (PORT_B, PORT_C));

    sim.set_joint_position("leftMotor0", 1.0);
    sim.set_joint_position("rightMotor0", 2.0);
    let sample = encoders.read_encoders().unwrap();
    assert!((sample.left.value() - 1f64.to_degrees()).abs() < 1e-9);
    assert!((sample.right.value() - 2f64.to_degrees()).abs() < 1e-9);
}
