//! # Brick Camera
//!
//! 从仿真视觉传感器获取图像，接口与树莓派 PiCamera 相近。
//!
//! 处理流程：取原始 RGB 字节 → 行序翻转（仿真器第 0 行在底部）→
//! 通道顺序（rgb / bgr）→ 可选 180° 旋转 → 区域插值缩放到配置分辨率。

mod camera;
mod error;
mod format;
mod frame;
pub mod resize;

pub use camera::Camera;
pub use error::CameraError;
pub use format::PixelFormat;
pub use frame::FrameBuffer;
