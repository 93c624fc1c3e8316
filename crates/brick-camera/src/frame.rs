//! 图像缓冲区

use crate::PixelFormat;
use image::RgbImage;

/// 相机输出缓冲区
///
/// 三通道 8 位图像，通道顺序由 [`format`](FrameBuffer::format) 决定
/// （`Bgr` 时 `image` 中的 "R" 通道实际存放蓝色）。
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    image: RgbImage,
    format: PixelFormat,
}

impl FrameBuffer {
    /// 创建全黑缓冲区，用于 [`Camera::capture_into`](crate::Camera::capture_into)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
            format: PixelFormat::default(),
        }
    }

    pub(crate) fn from_image(image: RgbImage, format: PixelFormat) -> Self {
        Self { image, format }
    }

    pub(crate) fn replace(&mut self, image: RgbImage, format: PixelFormat) {
        self.image = image;
        self.format = format;
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// 第 `y` 行（从上往下）第 `x` 列的像素，按缓冲区格式排列
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// 行优先的原始字节
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
