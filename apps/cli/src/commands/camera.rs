//! 相机命令：采集一帧并保存为图像文件

use anyhow::{Context, Result};
use brick_sdk::{Camera, PixelFormat};
use clap::Args;
use std::path::PathBuf;

use crate::session::CliContext;

/// 相机命令参数
#[derive(Args, Debug)]
pub struct CameraCommand {
    /// 像素格式（rgb 或 bgr）
    #[arg(short, long, default_value = "bgr")]
    pub format: String,

    /// 输出图像路径（PNG）
    #[arg(short, long, default_value = "frame.png")]
    pub output: PathBuf,

    /// 覆盖配置中的分辨率，如 --width 320 --height 240
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    #[arg(long, requires = "width")]
    pub height: Option<u32>,
}

impl CameraCommand {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let session = ctx.connect()?;
        let mut camera = Camera::new(session.brick.sim_handle().clone(), session.brick.config())?;
        if let (Some(width), Some(height)) = (self.width, self.height) {
            camera.set_resolution(width, height)?;
        }

        println!("📷 采集 {}x{} ({})...", camera.resolution().0, camera.resolution().1, self.format);
        let frame = camera.capture(&self.format)?;

        // 图像文件总是按 RGB 解释通道顺序
        let is_bgr = frame.format() == PixelFormat::Bgr;
        let mut image = frame.into_image();
        if is_bgr {
            for pixel in image.pixels_mut() {
                pixel.0.swap(0, 2);
            }
        }
        image
            .save(&self.output)
            .with_context(|| format!("保存图像失败: {}", self.output.display()))?;
        println!("💾 已保存到 {}", self.output.display());
        Ok(())
    }
}
