//! BrickPi3 兼容的设备门面
//!
//! 所有操作都先获取全局传输锁（[`SimHandle::lock`]），再获取设备表锁，
//! 因此同一时刻至多只有一个仿真器调用在进行，与调用线程无关。
//! 多端口操作在执行前先校验掩码中的所有端口，避免只执行一半。

use crate::DeviceError;
use crate::motor::{Motor, MotorRole};
use crate::sensor::{Sensor, SensorContext, create_sensor};
use brick_protocol::{Deg, DegPerSec, MotorPort, Port, PortMask, SensorKind, SensorPort, SensorValue};
use brick_tools::{BrickConfig, NoiseGenerator};
use brick_transport::{SimHandle, SimSession};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::thread;
use tracing::{debug, info, warn};

pub(crate) struct Devices {
    motors: HashMap<MotorPort, Motor>,
    sensors: HashMap<SensorPort, Box<dyn Sensor>>,
    noise: NoiseGenerator,
}

/// BrickPi3 设备门面
///
/// 通过 [`BrickPiBuilder`](crate::BrickPiBuilder) 构造。所有方法都是 `&self`，
/// 可以用 `Arc<BrickPi>` 在控制线程和里程计线程之间共享。
pub struct BrickPi {
    handle: SimHandle,
    config: BrickConfig,
    devices: Mutex<Devices>,
}

impl BrickPi {
    /// 解析配置中的电机（不启动仿真）
    pub(crate) fn attach(handle: SimHandle, config: BrickConfig) -> Result<Self, DeviceError> {
        let mut noise = NoiseGenerator::new(config.noise.seed);
        let mut motors = HashMap::new();
        {
            let mut session = handle.lock();
            let mut assigned = vec![
                (config.motors.left, MotorRole::Left),
                (config.motors.right, MotorRole::Right),
            ];
            if let Some(claw) = config.motors.claw {
                assigned.insert(0, (claw, MotorRole::Claw));
            }
            for (port, role) in assigned {
                let motor = Motor::attach(
                    &mut session,
                    role,
                    config.robot.id,
                    config.noise.encoder_std,
                    noise.fork(),
                )?;
                debug!("{} -> {} motor", port, role.as_str());
                motors.insert(port, motor);
            }
        }
        let sensor_noise = if config.noise.sensors {
            noise
        } else {
            NoiseGenerator::silent()
        };
        Ok(Self {
            handle,
            config,
            devices: Mutex::new(Devices {
                motors,
                sensors: HashMap::new(),
                noise: sensor_noise,
            }),
        })
    }

    /// 关闭同步模式，启动仿真，并等待场景稳定
    pub fn start_simulation(&self) -> Result<(), DeviceError> {
        {
            let mut session = self.handle.lock();
            session.set_synchronous(false)?;
            session.start_simulation()?;
        }
        let settle = self.config.transport.startup_settle();
        if !settle.is_zero() {
            thread::sleep(settle);
        }
        info!("Simulation started (robot {})", self.config.robot.id);
        Ok(())
    }

    pub fn config(&self) -> &BrickConfig {
        &self.config
    }

    /// 共享的仿真器句柄（相机等其他设备使用同一把锁）
    pub fn sim_handle(&self) -> &SimHandle {
        &self.handle
    }

    fn with_devices<R>(
        &self,
        f: impl FnOnce(&mut SimSession, &mut Devices) -> Result<R, DeviceError>,
    ) -> Result<R, DeviceError> {
        // 锁顺序：传输锁 -> 设备表锁
        let mut session = self.handle.lock();
        let mut devices = self.devices.lock();
        f(&mut session, &mut devices)
    }

    fn motor_ports(
        devices: &Devices,
        ports: PortMask<MotorPort>,
    ) -> Result<SmallVec<[MotorPort; 4]>, DeviceError> {
        let ports = ports.ports();
        if let Some(missing) = ports.iter().find(|p| !devices.motors.contains_key(*p)) {
            return Err(DeviceError::PortNotConfigured {
                port: missing.name(),
            });
        }
        Ok(ports)
    }

    /// 为掩码中的每个端口设置传感器类型
    ///
    /// 配置为备用超声波端口的端口使用备用朝向（如 `left`）。
    pub fn set_sensor_type(
        &self,
        ports: impl Into<PortMask<SensorPort>>,
        kind: SensorKind,
    ) -> Result<(), DeviceError> {
        let ports = ports.into();
        self.with_devices(|session, devices| {
            for port in ports.iter() {
                let direction = if self.config.ultrasonic.alt_port == Some(port) {
                    self.config.ultrasonic.alt_direction.as_str()
                } else {
                    self.config.ultrasonic.direction.as_str()
                };
                let ctx = SensorContext {
                    robot_id: self.config.robot.id,
                    direction,
                    geometry: &self.config.geometry,
                };
                let sensor = create_sensor(kind, session, &ctx, devices.noise.fork())?;
                debug!("{} configured as {}", port, kind);
                devices.sensors.insert(port, sensor);
            }
            Ok(())
        })
    }

    /// 读取单个传感器
    pub fn get_sensor(&self, port: SensorPort) -> Result<SensorValue, DeviceError> {
        self.with_devices(|session, devices| {
            let sensor = devices
                .sensors
                .get_mut(&port)
                .ok_or(DeviceError::PortNotConfigured { port: port.name() })?;
            sensor.read(session)
        })
    }

    /// 已配置的传感器类型
    pub fn sensor_type(&self, port: SensorPort) -> Option<SensorKind> {
        self.devices.lock().sensors.get(&port).map(|s| s.kind())
    }

    /// 设置电机目标速度（度/秒）
    pub fn set_motor_dps(
        &self,
        ports: impl Into<PortMask<MotorPort>>,
        dps: impl Into<DegPerSec>,
    ) -> Result<(), DeviceError> {
        let ports = ports.into();
        let dps = dps.into();
        self.with_devices(|session, devices| {
            for port in Self::motor_ports(devices, ports)? {
                if let Some(motor) = devices.motors.get_mut(&port) {
                    motor.set_dps(session, dps)?;
                }
            }
            Ok(())
        })
    }

    /// 将编码器清零
    pub fn reset_motor_encoder(&self, ports: impl Into<PortMask<MotorPort>>) -> Result<(), DeviceError> {
        let ports = ports.into();
        self.with_devices(|session, devices| {
            for port in Self::motor_ports(devices, ports)? {
                if let Some(motor) = devices.motors.get_mut(&port) {
                    motor.set_encoder(session, Deg::ZERO)?;
                }
            }
            Ok(())
        })
    }

    /// 编码器减去 `offset` 度
    ///
    /// 以当前读数作为 offset 即可将编码器清零。
    pub fn offset_motor_encoder(
        &self,
        ports: impl Into<PortMask<MotorPort>>,
        offset: f64,
    ) -> Result<(), DeviceError> {
        let ports = ports.into();
        self.with_devices(|session, devices| {
            for port in Self::motor_ports(devices, ports)? {
                if let Some(motor) = devices.motors.get_mut(&port) {
                    let current = motor.read(session)?;
                    motor.set_encoder(session, current - Deg(offset))?;
                }
            }
            Ok(())
        })
    }

    /// 读取编码器（自上次清零以来的累计角度，度）
    pub fn get_motor_encoder(&self, port: MotorPort) -> Result<f64, DeviceError> {
        self.with_devices(|session, devices| {
            let motor = devices
                .motors
                .get_mut(&port)
                .ok_or(DeviceError::PortNotConfigured { port: port.name() })?;
            Ok(motor.read(session)?.value())
        })
    }

    /// 在一次加锁内读取多个编码器（按给定顺序）
    pub fn get_motor_encoders<const N: usize>(
        &self,
        ports: [MotorPort; N],
    ) -> Result<[f64; N], DeviceError> {
        self.with_devices(|session, devices| {
            let mut values = [0.0; N];
            for (value, port) in values.iter_mut().zip(ports) {
                let motor = devices
                    .motors
                    .get_mut(&port)
                    .ok_or(DeviceError::PortNotConfigured { port: port.name() })?;
                *value = motor.read(session)?.value();
            }
            Ok(values)
        })
    }

    /// 停止仿真并关闭连接
    ///
    /// 之后的调用返回 [`DeviceError::Unavailable`]，直到 [`reconnect`](Self::reconnect)。
    pub fn reset_all(&self) -> Result<(), DeviceError> {
        let mut session = self.handle.lock();
        let stopped = session.stop_simulation();
        session.disconnect();
        match stopped {
            Ok(()) => {
                info!("Simulation stopped, connection closed");
                Ok(())
            },
            Err(e) => {
                warn!("Failed to stop simulation: {}", e);
                Err(e.into())
            },
        }
    }

    /// 重新建立连接（已解析的对象句柄保持有效）
    pub fn reconnect(&self) -> Result<(), DeviceError> {
        self.handle.lock().reconnect()?;
        Ok(())
    }
}

impl fmt::Debug for BrickPi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let devices = self.devices.lock();
        let mut motors: Vec<_> = devices.motors.keys().copied().collect();
        motors.sort();
        let mut sensors: Vec<_> = devices.sensors.keys().copied().collect();
        sensors.sort();
        f.debug_struct("BrickPi")
            .field("robot_id", &self.config.robot.id)
            .field("motors", &motors)
            .field("sensors", &sensors)
            .finish()
    }
}
