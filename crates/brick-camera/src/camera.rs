//! 仿真相机

use crate::resize::resize_area;
use crate::{CameraError, FrameBuffer, PixelFormat};
use brick_protocol::{ObjectHandle, VisionImage};
use brick_tools::BrickConfig;
use brick_transport::SimHandle;
use image::{RgbImage, imageops};
use std::fmt;
use tracing::{debug, info};

/// 仿真相机（接口与 PiCamera 相近）
///
/// 图像请求经过与 [`BrickPi`](brick_driver::BrickPi) 相同的全局传输锁；
/// 格式转换、翻转和缩放在锁外完成。
pub struct Camera {
    handle: SimHandle,
    object: ObjectHandle,
    resolution: (u32, u32),
    reverse: bool,
}

impl Camera {
    /// 解析 `visionCamera{id}` 对象
    pub fn new(handle: SimHandle, config: &BrickConfig) -> Result<Self, CameraError> {
        let name = format!("visionCamera{}", config.robot.id);
        let object = handle.lock().get_object_handle(&name)?;
        info!(
            "Camera `{}` ready ({}x{}, reverse = {})",
            name, config.camera.width, config.camera.height, config.camera.reverse
        );
        Ok(Self {
            handle,
            object,
            resolution: (config.camera.width, config.camera.height),
            reverse: config.camera.reverse,
        })
    }

    /// 输出分辨率 `(width, height)`
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidResolution { width, height });
        }
        self.resolution = (width, height);
        Ok(())
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// 拍摄一帧，`format` 为 "rgb" 或 "bgr"
    pub fn capture(&self, format: &str) -> Result<FrameBuffer, CameraError> {
        let format = format.parse()?;
        Ok(FrameBuffer::from_image(self.capture_image(format)?, format))
    }

    /// 拍摄到已有缓冲区，缓冲区尺寸必须等于相机分辨率
    pub fn capture_into(&self, output: &mut FrameBuffer, format: &str) -> Result<(), CameraError> {
        let format: PixelFormat = format.parse()?;
        if output.size() != self.resolution {
            return Err(CameraError::ResolutionMismatch {
                expected: self.resolution,
                actual: output.size(),
            });
        }
        output.replace(self.capture_image(format)?, format);
        Ok(())
    }

    fn capture_image(&self, format: PixelFormat) -> Result<RgbImage, CameraError> {
        let raw = self
            .handle
            .lock()
            .get_vision_sensor_image(self.object, false)?;
        debug!("Captured {}x{} frame", raw.width, raw.height);

        let mut image = to_top_down(&raw)?;
        if format == PixelFormat::Bgr {
            for pixel in image.pixels_mut() {
                pixel.0.swap(0, 2);
            }
        }
        if self.reverse {
            imageops::rotate180_in_place(&mut image);
        }
        let (width, height) = self.resolution;
        Ok(resize_area(&image, width, height))
    }
}

/// 仿真器的图像第 0 行在底部，翻转为从上往下的行序
fn to_top_down(raw: &VisionImage) -> Result<RgbImage, CameraError> {
    if raw.width == 0 || raw.height == 0 {
        return Err(CameraError::InvalidResolution {
            width: raw.width,
            height: raw.height,
        });
    }
    let expected = raw.width as usize * raw.height as usize * 3;
    if raw.grayscale || raw.data.len() != expected {
        return Err(brick_driver::DeviceError::UnexpectedReply(
            brick_protocol::ProtocolError::InvalidImage {
                expected,
                actual: raw.data.len(),
            },
        )
        .into());
    }
    let row = raw.width as usize * 3;
    let mut data = Vec::with_capacity(expected);
    for chunk in raw.data.chunks_exact(row).rev() {
        data.extend_from_slice(chunk);
    }
    RgbImage::from_raw(raw.width, raw.height, data).ok_or(CameraError::InvalidResolution {
        width: raw.width,
        height: raw.height,
    })
}

impl fmt::Debug for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Camera")
            .field("object", &self.object)
            .field("resolution", &self.resolution)
            .field("reverse", &self.reverse)
            .finish()
    }
}
