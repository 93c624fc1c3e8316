//! 内存仿真器（Mock 模式）
//!
//! 不依赖外部仿真进程，用于单元测试、集成测试和 CLI 的离线演示。
//! 关节位置按目标速度随墙钟时间积分；支持注入延迟、不可达、
//! 瞬时故障和"N 次调用后失联"。

use crate::{Connector, SimTransport, TransportError};
use brick_protocol::{ObjectHandle, SimReply, SimRequest, VisionImage};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 调用日志保留的最近请求数
pub const CALL_LOG_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct MockJoint {
    base_position: f64,
    target_velocity: f64,
    since: Instant,
}

impl MockJoint {
    fn new() -> Self {
        Self {
            base_position: 0.0,
            target_velocity: 0.0,
            since: Instant::now(),
        }
    }

    fn position(&self) -> f64 {
        self.base_position + self.target_velocity * self.since.elapsed().as_secs_f64()
    }

    fn rebase(&mut self) {
        self.base_position = self.position();
        self.since = Instant::now();
    }
}

#[derive(Debug, Default)]
struct MockWorld {
    objects: HashMap<String, ObjectHandle>,
    next_handle: i32,
    joints: HashMap<ObjectHandle, MockJoint>,
    proximity: HashMap<ObjectHandle, (bool, f64)>,
    vision: HashMap<ObjectHandle, VisionImage>,
    running: bool,
    synchronous: bool,
    /// 最近的请求（环形缓冲，超出容量时丢弃最旧的）
    calls: VecDeque<SimRequest>,
    /// 累计成功处理的请求数
    handled: usize,
    unreachable: bool,
    fail_after: Option<usize>,
    transient_failures: usize,
    latency: Duration,
    connections: usize,
}

impl MockWorld {
    fn register(&mut self, name: &str) -> ObjectHandle {
        if let Some(handle) = self.objects.get(name) {
            return *handle;
        }
        self.next_handle += 1;
        let handle = ObjectHandle(self.next_handle);
        self.objects.insert(name.to_string(), handle);
        handle
    }

    fn lookup(&self, name: &str) -> Option<ObjectHandle> {
        self.objects.get(name).copied()
    }

    fn failure(message: impl Into<String>) -> SimReply {
        SimReply::Failure {
            message: message.into(),
        }
    }

    fn handle(&mut self, request: SimRequest) -> SimReply {
        match request {
            SimRequest::GetObjectHandle { name } => match self.lookup(&name) {
                Some(handle) => SimReply::Handle(handle),
                None => Self::failure(format!("object `{name}` does not exist")),
            },
            SimRequest::SetJointTargetVelocity { handle, velocity } => {
                match self.joints.get_mut(&handle) {
                    Some(joint) => {
                        joint.rebase();
                        joint.target_velocity = velocity;
                        SimReply::Ack
                    },
                    None => Self::failure(format!("{handle} is not a joint")),
                }
            },
            SimRequest::GetJointTargetVelocity { handle } => match self.joints.get(&handle) {
                Some(joint) => SimReply::Float(joint.target_velocity),
                None => Self::failure(format!("{handle} is not a joint")),
            },
            SimRequest::GetJointPosition { handle } => match self.joints.get(&handle) {
                Some(joint) => SimReply::Float(joint.position()),
                None => Self::failure(format!("{handle} is not a joint")),
            },
            SimRequest::SetJointPosition { handle, position } => {
                match self.joints.get_mut(&handle) {
                    Some(joint) => {
                        joint.base_position = position;
                        joint.since = Instant::now();
                        SimReply::Ack
                    },
                    None => Self::failure(format!("{handle} is not a joint")),
                }
            },
            SimRequest::CheckProximitySensor { handle } => match self.proximity.get(&handle) {
                Some((detected, distance)) => SimReply::Proximity {
                    detected: *detected,
                    distance: *distance,
                },
                None => Self::failure(format!("{handle} is not a proximity sensor")),
            },
            SimRequest::GetVisionSensorImage { handle, grayscale } => {
                match self.vision.get(&handle) {
                    Some(image) if grayscale => SimReply::Image(to_grayscale(image)),
                    Some(image) => SimReply::Image(image.clone()),
                    None => Self::failure(format!("{handle} is not a vision sensor")),
                }
            },
            SimRequest::SetSynchronous { enabled } => {
                self.synchronous = enabled;
                SimReply::Ack
            },
            SimRequest::StartSimulation => {
                self.running = true;
                SimReply::Ack
            },
            SimRequest::StopSimulation => {
                self.running = false;
                for joint in self.joints.values_mut() {
                    joint.rebase();
                    joint.target_velocity = 0.0;
                }
                SimReply::Ack
            },
        }
    }
}

fn to_grayscale(image: &VisionImage) -> VisionImage {
    if image.grayscale {
        return image.clone();
    }
    let data = image
        .data
        .chunks_exact(3)
        .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
        .collect();
    VisionImage {
        width: image.width,
        height: image.height,
        grayscale: true,
        data,
    }
}

struct Shared {
    world: Mutex<MockWorld>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// 内存仿真器
///
/// 克隆共享同一个仿真世界。
///
/// # 示例
///
/// ```rust,ignore
/// use brick_transport::mock::MockSimulator;
/// use brick_transport::SimHandle;
/// use std::time::Duration;
///
/// let sim = MockSimulator::with_robot_scene(0);
/// let handle = SimHandle::connect(sim.connector(), Duration::from_secs(1)).unwrap();
/// let motor = handle.lock().get_object_handle("leftMotor0").unwrap();
/// assert_eq!(handle.lock().get_joint_position(motor).unwrap(), 0.0);
/// ```
#[derive(Clone)]
pub struct MockSimulator {
    shared: Arc<Shared>,
}

impl MockSimulator {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                world: Mutex::new(MockWorld::default()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// 预置标准场景：左/右/爪电机、前/左超声波、光线传感器和相机
    pub fn with_robot_scene(robot_id: u32) -> Self {
        let sim = Self::new();
        for position in ["left", "right", "claw"] {
            sim.add_joint(&format!("{position}Motor{robot_id}"));
        }
        for direction in ["front", "left"] {
            sim.add_proximity_sensor(&format!("{direction}ProximitySensor{robot_id}"));
        }
        sim.add_vision_sensor(&format!("visionLight{robot_id}"), solid_image(1, 1, [128, 128, 128]));
        sim.add_vision_sensor(&format!("visionCamera{robot_id}"), gradient_image(64, 48));
        sim
    }

    /// 供 [`SimSession`](crate::SimSession) 使用的连接工厂
    pub fn connector(&self) -> Arc<dyn Connector> {
        let sim = self.clone();
        Arc::new(move || -> Result<Box<dyn SimTransport>, TransportError> {
            let mut world = sim.shared.world.lock();
            if world.unreachable {
                return Err(TransportError::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "simulator is not running",
                )));
            }
            world.connections += 1;
            Ok(Box::new(MockTransport {
                shared: sim.shared.clone(),
                call_timeout: Duration::from_secs(2),
            }))
        })
    }

    pub fn add_joint(&self, name: &str) -> ObjectHandle {
        let mut world = self.shared.world.lock();
        let handle = world.register(name);
        world.joints.entry(handle).or_insert_with(MockJoint::new);
        handle
    }

    pub fn add_proximity_sensor(&self, name: &str) -> ObjectHandle {
        let mut world = self.shared.world.lock();
        let handle = world.register(name);
        world.proximity.entry(handle).or_insert((false, 0.0));
        handle
    }

    pub fn add_vision_sensor(&self, name: &str, image: VisionImage) -> ObjectHandle {
        let mut world = self.shared.world.lock();
        let handle = world.register(name);
        world.vision.insert(handle, image);
        handle
    }

    /// 设置超声波检测结果（距离单位：米）
    pub fn set_proximity(&self, name: &str, detected: bool, distance: f64) {
        let mut world = self.shared.world.lock();
        if let Some(handle) = world.lookup(name) {
            world.proximity.insert(handle, (detected, distance));
        }
    }

    pub fn set_vision_image(&self, name: &str, image: VisionImage) {
        let mut world = self.shared.world.lock();
        if let Some(handle) = world.lookup(name) {
            world.vision.insert(handle, image);
        }
    }

    /// 直接设置关节位置（弧度），并清零目标速度
    pub fn set_joint_position(&self, name: &str, position: f64) {
        let mut world = self.shared.world.lock();
        if let Some(handle) = world.lookup(name)
            && let Some(joint) = world.joints.get_mut(&handle)
        {
            joint.base_position = position;
            joint.target_velocity = 0.0;
            joint.since = Instant::now();
        }
    }

    pub fn joint_position(&self, name: &str) -> Option<f64> {
        let world = self.shared.world.lock();
        let handle = world.lookup(name)?;
        world.joints.get(&handle).map(MockJoint::position)
    }

    pub fn joint_target_velocity(&self, name: &str) -> Option<f64> {
        let world = self.shared.world.lock();
        let handle = world.lookup(name)?;
        world.joints.get(&handle).map(|j| j.target_velocity)
    }

    /// 模拟仿真器未运行：新连接与已有连接的调用都会失败
    pub fn set_unreachable(&self, unreachable: bool) {
        self.shared.world.lock().unreachable = unreachable;
    }

    /// 成功处理 `calls` 次调用后，仿真器失联
    pub fn fail_after(&self, calls: usize) {
        self.shared.world.lock().fail_after = Some(calls);
    }

    /// 接下来的 `count` 次调用返回 IO 错误，之后恢复
    pub fn fail_next(&self, count: usize) {
        self.shared.world.lock().transient_failures = count;
    }

    /// 每次调用的往返延迟
    pub fn set_latency(&self, latency: Duration) {
        self.shared.world.lock().latency = latency;
    }

    pub fn is_running(&self) -> bool {
        self.shared.world.lock().running
    }

    pub fn is_synchronous(&self) -> bool {
        self.shared.world.lock().synchronous
    }

    /// 最近成功处理的请求（按到达顺序，至多 [`CALL_LOG_CAPACITY`] 条）
    pub fn calls(&self) -> Vec<SimRequest> {
        self.shared.world.lock().calls.iter().cloned().collect()
    }

    /// 累计成功处理的请求数（不受日志容量限制）
    pub fn call_count(&self) -> usize {
        self.shared.world.lock().handled
    }

    pub fn clear_calls(&self) {
        self.shared.world.lock().calls.clear();
    }

    pub fn connection_count(&self) -> usize {
        self.shared.world.lock().connections
    }

    /// 观察到的最大并发调用数（正确串行化时为 1）
    pub fn max_in_flight(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockSimulator {
    fn default() -> Self {
        Self::new()
    }
}

struct MockTransport {
    shared: Arc<Shared>,
    call_timeout: Duration,
}

impl MockTransport {
    fn io_error(message: &str) -> TransportError {
        TransportError::Io(io::Error::new(io::ErrorKind::ConnectionReset, message.to_string()))
    }
}

impl SimTransport for MockTransport {
    fn call(&mut self, request: SimRequest) -> Result<SimReply, TransportError> {
        let latency = {
            let mut world = self.shared.world.lock();
            if world.unreachable {
                return Err(Self::io_error("simulator is not running"));
            }
            if world.fail_after.is_some_and(|n| world.handled >= n) {
                return Err(Self::io_error("simulator connection lost"));
            }
            if world.transient_failures > 0 {
                world.transient_failures -= 1;
                return Err(Self::io_error("transient simulator failure"));
            }
            world.latency
        };

        let current = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if latency > self.call_timeout {
            std::thread::sleep(self.call_timeout);
            self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(TransportError::Timeout {
                request: request.name(),
                timeout: self.call_timeout,
            });
        }
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let reply = {
            let mut world = self.shared.world.lock();
            if world.calls.len() == CALL_LOG_CAPACITY {
                world.calls.pop_front();
            }
            world.calls.push_back(request.clone());
            world.handled += 1;
            world.handle(request)
        };
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(reply)
    }

    fn set_call_timeout(&mut self, timeout: Duration) {
        self.call_timeout = timeout;
    }
}

/// 单色 RGB 图像
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> VisionImage {
    let data = rgb
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 3)
        .collect();
    VisionImage {
        width,
        height,
        grayscale: false,
        data,
    }
}

/// 水平红色渐变 + 垂直绿色渐变的 RGB 图像
pub fn gradient_image(width: u32, height: u32) -> VisionImage {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(64);
        }
    }
    VisionImage {
        width,
        height,
        grayscale: false,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimHandle;

    fn handle(sim: &MockSimulator) -> SimHandle {
        SimHandle::connect(sim.connector(), Duration::from_millis(50)).unwrap()
    }

    #[test]
    fn test_joint_integrates_target_velocity() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        let motor = handle.lock().get_object_handle("leftMotor0").unwrap();
        handle.lock().set_joint_target_velocity(motor, 10.0).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let position = handle.lock().get_joint_position(motor).unwrap();
        assert!(position > 0.1, "position = {}", position);
    }

    #[test]
    fn test_latency_beyond_timeout() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        sim.set_latency(Duration::from_millis(200));
        let start = Instant::now();
        let result = handle.lock().start_simulation();
        assert!(matches!(result, Err(TransportError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn test_fail_after_and_transient() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        sim.fail_next(1);
        assert!(handle.lock().start_simulation().is_err());
        assert!(handle.lock().start_simulation().is_ok());

        sim.fail_after(2);
        assert!(handle.lock().stop_simulation().is_ok());
        assert!(matches!(
            handle.lock().stop_simulation(),
            Err(TransportError::Io(_))
        ));
    }

    #[test]
    fn test_call_log_is_bounded() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        let motor = handle.lock().get_object_handle("leftMotor0").unwrap();
        for _ in 0..CALL_LOG_CAPACITY + 10 {
            handle.lock().get_joint_position(motor).unwrap();
        }
        handle.lock().stop_simulation().unwrap();

        let calls = sim.calls();
        assert_eq!(calls.len(), CALL_LOG_CAPACITY);
        assert_eq!(calls.last(), Some(&SimRequest::StopSimulation));
        assert_eq!(sim.call_count(), CALL_LOG_CAPACITY + 12);

        // 失联计数使用累计值，不受日志截断影响
        sim.fail_after(CALL_LOG_CAPACITY + 13);
        assert!(handle.lock().start_simulation().is_ok());
        assert!(handle.lock().start_simulation().is_err());
    }

    #[test]
    fn test_grayscale_conversion() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        let light = handle.lock().get_object_handle("visionLight0").unwrap();
        let image = handle.lock().get_vision_sensor_image(light, true).unwrap();
        assert!(image.grayscale);
        assert_eq!(image.data, vec![128]);
    }

    #[test]
    fn test_stop_simulation_halts_joints() {
        let sim = MockSimulator::with_robot_scene(0);
        let handle = handle(&sim);
        let motor = handle.lock().get_object_handle("rightMotor0").unwrap();
        handle.lock().start_simulation().unwrap();
        handle.lock().set_joint_target_velocity(motor, 1.0).unwrap();
        handle.lock().stop_simulation().unwrap();
        assert!(!sim.is_running());
        assert_eq!(sim.joint_target_velocity("rightMotor0"), Some(0.0));
    }
}
