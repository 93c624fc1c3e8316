//! 区域插值缩放
//!
//! 缩小时按源像素与目标像素的覆盖面积加权平均；放大时退化为双线性插值。

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// 单个目标坐标覆盖的源坐标及权重
fn area_weights(src: u32, dst: u32) -> Vec<Vec<(u32, f32)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = (start + scale).min(src as f64);
            let mut weights = Vec::with_capacity(scale.ceil() as usize + 1);
            let mut s = start.floor() as u32;
            while (s as f64) < end && s < src {
                let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                if overlap > 1e-9 {
                    weights.push((s, (overlap / scale) as f32));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

/// 缩放到 `width x height`
pub fn resize_area(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return image.clone();
    }
    if width > src_w || height > src_h {
        return imageops::resize(image, width, height, FilterType::Triangle);
    }

    let xs = area_weights(src_w, width);
    let ys = area_weights(src_h, height);
    let mut out = RgbImage::new(width, height);
    for (oy, row) in ys.iter().enumerate() {
        for (ox, col) in xs.iter().enumerate() {
            let mut acc = [0f32; 3];
            for &(sy, wy) in row {
                for &(sx, wx) in col {
                    let px = image.get_pixel(sx, sy).0;
                    let w = wx * wy;
                    for c in 0..3 {
                        acc[c] += px[c] as f32 * w;
                    }
                }
            }
            let px = acc.map(|v| v.round().clamp(0.0, 255.0) as u8);
            out.put_pixel(ox as u32, oy as u32, Rgb(px));
        }
    }
    out
}
