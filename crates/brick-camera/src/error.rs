//! 相机错误类型定义

use brick_driver::DeviceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    /// 仅支持 "rgb" 和 "bgr"
    #[error("Unsupported pixel format `{0}` (only rgb and bgr are supported)")]
    UnsupportedFormat(String),

    /// 输出缓冲区尺寸与相机分辨率不一致
    #[error("Camera resolution {expected:?} and buffer resolution {actual:?} aren't equal")]
    ResolutionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    /// 仿真器无法返回图像
    #[error("Camera device error: {0}")]
    Device(#[from] DeviceError),
}

impl From<brick_transport::TransportError> for CameraError {
    fn from(err: brick_transport::TransportError) -> Self {
        CameraError::Device(err.into())
    }
}
