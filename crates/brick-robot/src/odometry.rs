//! 周期性里程计更新线程
//!
//! # 线程模型
//!
//! - 每个 [`OdometryUpdater`] 至多一个更新线程，位姿的唯一写者
//! - 位姿与速度作为一个整体保存在同一把锁内，读者永远看到某一次更新后的完整快照
//! - 停止是协作式的：`stop()` 清除运行标志并通过 channel 唤醒正在休眠的线程，
//!   然后 join。正在进行中的设备调用会先完成（受传输层调用超时约束）。
//!
//! # 每个周期
//!
//! 1. 记录起始时间
//! 2. 读取左右驱动轮编码器
//! 3. 由运动学模型计算相对上一次读数的位移
//! 4. 在一个临界区内更新 (x, y, heading) 和速度
//! 5. 休眠 `max(0, period - elapsed)`，落后时不休眠
//! 6. 检查运行标志
//!
//! # 编码器基准
//!
//! 基准初始为编码器清零值（[`EncoderSample::default`]），因此启动后的第一个
//! 周期就积分自己的增量。基准跨越 stop/start 保留：编码器读数是累计值，
//! 停止期间的车轮运动会在重新启动后的第一个周期计入。

use crate::kinematics::DifferentialDrive;
use crate::{OdometryError, Pose, Velocity};
use brick_driver::{EncoderSample, EncoderSource};
use brick_tools::OdometryConfig;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// 更新器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdometryState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, Default)]
struct Estimate {
    pose: Pose,
    velocity: Velocity,
}

struct Shared {
    /// 位姿与速度（同一把锁）
    estimate: Mutex<Estimate>,
    /// 上一次积分使用的编码器读数（仅更新线程写入）
    baseline: Mutex<EncoderSample>,
    /// 运行标志
    running: AtomicBool,
    /// 已完成的积分周期数
    ticks: AtomicU64,
    last_error: Mutex<Option<Arc<OdometryError>>>,
}

impl Shared {
    fn snapshot(&self) -> Estimate {
        *self.estimate.lock()
    }
}

struct Worker {
    thread: JoinHandle<()>,
    stop_tx: Sender<()>,
}

/// 里程计更新器
///
/// # 示例
///
/// ```rust,ignore
/// let mut odometry = OdometryUpdater::new(encoders, kinematics, config, Pose::ORIGIN);
/// odometry.start()?;
/// let reader = odometry.reader();
/// std::thread::spawn(move || println!("{}", reader.read_pose()));
/// odometry.stop()?;
/// ```
pub struct OdometryUpdater {
    shared: Arc<Shared>,
    source: Arc<Mutex<Box<dyn EncoderSource>>>,
    kinematics: DifferentialDrive,
    config: OdometryConfig,
    worker: Option<Worker>,
}

impl OdometryUpdater {
    pub fn new(
        source: impl EncoderSource,
        kinematics: DifferentialDrive,
        config: OdometryConfig,
        initial_pose: Pose,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                estimate: Mutex::new(Estimate {
                    pose: initial_pose,
                    velocity: Velocity::ZERO,
                }),
                baseline: Mutex::new(EncoderSample::default()),
                running: AtomicBool::new(false),
                ticks: AtomicU64::new(0),
                last_error: Mutex::new(None),
            }),
            source: Arc::new(Mutex::new(Box::new(source))),
            kinematics,
            config,
            worker: None,
        }
    }

    /// 启动更新线程（立即返回）
    ///
    /// 上一个线程仍在运行时返回 [`OdometryError::AlreadyRunning`]，且不影响它。
    /// 上一个线程因致命错误退出后可以再次启动，`last_error` 会被清除。
    pub fn start(&mut self) -> Result<(), OdometryError> {
        if self.shared.running.load(Ordering::Acquire) {
            return Err(OdometryError::AlreadyRunning);
        }
        // 回收因致命错误自行退出的线程
        self.join_worker()?;

        *self.shared.last_error.lock() = None;
        self.shared.running.store(true, Ordering::Release);

        let (stop_tx, stop_rx) = bounded(1);
        let ctx = LoopContext {
            shared: self.shared.clone(),
            source: self.source.clone(),
            kinematics: self.kinematics,
            config: self.config.clone(),
            stop_rx,
        };
        let spawned = thread::Builder::new()
            .name("brick-odometry".to_string())
            .spawn(move || ctx.run());
        match spawned {
            Ok(thread) => {
                self.worker = Some(Worker { thread, stop_tx });
                info!("Odometry started (period {:?})", self.config.period());
                Ok(())
            },
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                error!("Failed to spawn odometry thread: {}", e);
                Err(OdometryError::Spawn(e))
            },
        }
    }

    /// 停止更新线程并等待其退出；已停止时直接返回 `Ok(())`
    pub fn stop(&mut self) -> Result<(), OdometryError> {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = &self.worker {
            // 唤醒休眠中的线程；已满说明唤醒信号已在途
            let _ = worker.stop_tx.try_send(());
        }
        let was_running = self.worker.is_some();
        self.join_worker()?;
        if was_running {
            info!("Odometry stopped at {}", self.read_pose());
        }
        Ok(())
    }

    fn join_worker(&mut self) -> Result<(), OdometryError> {
        if let Some(worker) = self.worker.take() {
            drop(worker.stop_tx);
            if worker.thread.join().is_err() {
                error!("Odometry thread panicked");
                return Err(OdometryError::WorkerPanicked);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> OdometryState {
        if self.shared.running.load(Ordering::Acquire) {
            OdometryState::Running
        } else {
            OdometryState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == OdometryState::Running
    }

    /// 当前位姿快照
    pub fn read_pose(&self) -> Pose {
        self.shared.snapshot().pose
    }

    /// 最近一个周期的速度
    pub fn read_speed(&self) -> Velocity {
        self.shared.snapshot().velocity
    }

    /// 重设位姿估计（运行中也可调用）
    pub fn reset_pose(&self, pose: Pose) {
        let mut estimate = self.shared.estimate.lock();
        estimate.pose = pose;
        estimate.velocity = Velocity::ZERO;
    }

    /// 导致更新线程停止的错误
    pub fn last_error(&self) -> Option<Arc<OdometryError>> {
        self.shared.last_error.lock().clone()
    }

    /// 已完成的积分周期数
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }

    /// 可跨线程共享的只读句柄
    pub fn reader(&self) -> PoseReader {
        PoseReader {
            shared: self.shared.clone(),
        }
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }
}

impl Drop for OdometryUpdater {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Failed to stop odometry on drop: {}", e);
        }
    }
}

/// 位姿只读句柄（可克隆，可发送到其他线程）
#[derive(Clone)]
pub struct PoseReader {
    shared: Arc<Shared>,
}

impl PoseReader {
    pub fn read_pose(&self) -> Pose {
        self.shared.snapshot().pose
    }

    pub fn read_speed(&self) -> Velocity {
        self.shared.snapshot().velocity
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }
}

struct LoopContext {
    shared: Arc<Shared>,
    source: Arc<Mutex<Box<dyn EncoderSource>>>,
    kinematics: DifferentialDrive,
    config: OdometryConfig,
    stop_rx: Receiver<()>,
}

impl LoopContext {
    fn run(self) {
        let period = self.config.period();
        // 本次启动内上一次成功读数的时间；首个周期按名义周期计算速度
        let mut last_at: Option<Instant> = None;
        let mut failures = 0u32;
        debug!("Odometry loop running");

        while self.shared.running.load(Ordering::Acquire) {
            let tick_start = Instant::now();

            let reading = self.source.lock().read_encoders();
            match reading {
                Ok(sample) => {
                    failures = 0;
                    let dt = match last_at {
                        Some(prev_at) => tick_start.duration_since(prev_at).as_secs_f64(),
                        None => period.as_secs_f64(),
                    };
                    let prev = std::mem::replace(&mut *self.shared.baseline.lock(), sample);
                    self.apply(sample, prev, dt);
                    last_at = Some(tick_start);
                },
                Err(e) => {
                    failures += 1;
                    if failures > self.config.max_consecutive_failures {
                        error!(
                            "Encoder read failed ({} in a row): {}. Stopping odometry.",
                            failures, e
                        );
                        *self.shared.last_error.lock() = Some(Arc::new(OdometryError::Device {
                            failures,
                            source: e,
                        }));
                        self.shared.running.store(false, Ordering::Release);
                        break;
                    }
                    warn!(
                        "Encoder read failed ({}/{}): {}, retrying next tick",
                        failures, self.config.max_consecutive_failures, e
                    );
                },
            }

            if let Some(remaining) = period.checked_sub(tick_start.elapsed()) {
                match self.stop_rx.recv_timeout(remaining) {
                    Err(RecvTimeoutError::Timeout) => {},
                    // 收到停止信号或更新器已被丢弃
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        }
        debug!("Odometry loop exited");
    }

    fn apply(&self, sample: EncoderSample, prev: EncoderSample, dt: f64) {
        let d_left = (sample.left - prev.left).to_rad();
        let d_right = (sample.right - prev.right).to_rad();
        let delta = self.kinematics.displacement(d_left, d_right);

        let pose = {
            let mut estimate = self.shared.estimate.lock();
            estimate.pose = self.kinematics.integrate(estimate.pose, delta);
            estimate.velocity = delta.velocity(dt);
            estimate.pose
        };
        self.shared.ticks.fetch_add(1, Ordering::AcqRel);
        trace!("Odometry tick: {}", pose);
    }
}
