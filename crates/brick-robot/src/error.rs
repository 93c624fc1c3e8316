//! 里程计错误类型定义

use brick_driver::DeviceError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OdometryError {
    /// 上一个更新线程仍在运行
    #[error("Odometry updater is already running")]
    AlreadyRunning,

    /// 连续读取编码器失败次数超过阈值，更新线程已停止
    #[error("Encoder read failed {failures} time(s) in a row: {source}")]
    Device {
        failures: u32,
        #[source]
        source: DeviceError,
    },

    /// 无法创建更新线程
    #[error("Failed to spawn odometry thread: {0}")]
    Spawn(#[from] io::Error),

    /// 更新线程 panic
    #[error("Odometry thread panicked")]
    WorkerPanicked,
}

impl OdometryError {
    /// 导致停止的设备错误（如有）
    pub fn device_error(&self) -> Option<&DeviceError> {
        match self {
            OdometryError::Device { source, .. } => Some(source),
            _ => None,
        }
    }
}
