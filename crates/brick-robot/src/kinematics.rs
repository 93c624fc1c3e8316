//! 差速驱动运动学
//!
//! 正向：由左右轮转角增量计算位移并按圆弧积分位姿。
//! 逆向：由期望的 `(v, w)` 计算左右轮目标角速度。
//!
//! ```text
//! ds = r · (Δφr + Δφl) / 2
//! dθ = r · (Δφr − Δφl) / L
//! ```

use crate::{Pose, Velocity};
use brick_protocol::{DegPerSec, Rad};
use brick_tools::GeometryConfig;

/// 小于该值的 `dθ` 视为直线运动
const STRAIGHT_EPSILON: f64 = 1e-9;

/// 一个更新周期内的位移
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Displacement {
    /// 沿航向的弧长（米）
    pub ds: f64,
    /// 航向变化（弧度）
    pub dtheta: f64,
}

impl Displacement {
    /// 除以经过的时间得到速度；`dt` 非正时返回零速度
    pub fn velocity(&self, dt: f64) -> Velocity {
        if dt > 0.0 {
            Velocity::new(self.ds / dt, self.dtheta / dt)
        } else {
            Velocity::ZERO
        }
    }
}

/// 差速驱动模型
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    wheel_radius: f64,
    wheel_separation: f64,
}

impl DifferentialDrive {
    pub fn new(wheel_radius: f64, wheel_separation: f64) -> Self {
        Self {
            wheel_radius,
            wheel_separation,
        }
    }

    pub fn from_config(geometry: &GeometryConfig) -> Self {
        Self::new(geometry.wheel_radius, geometry.wheel_separation)
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn wheel_separation(&self) -> f64 {
        self.wheel_separation
    }

    /// 左右轮转角增量 → 位移
    pub fn displacement(&self, d_left: Rad, d_right: Rad) -> Displacement {
        let r = self.wheel_radius;
        Displacement {
            ds: r * (d_right.value() + d_left.value()) / 2.0,
            dtheta: r * (d_right.value() - d_left.value()) / self.wheel_separation,
        }
    }

    /// 将位移积分到位姿上
    pub fn integrate(&self, pose: Pose, delta: Displacement) -> Pose {
        let Displacement { ds, dtheta } = delta;
        let theta = pose.heading;
        let (x, y) = if dtheta.abs() < STRAIGHT_EPSILON {
            (pose.x + ds * theta.cos(), pose.y + ds * theta.sin())
        } else {
            let radius = ds / dtheta;
            (
                pose.x + radius * ((theta + dtheta).sin() - theta.sin()),
                pose.y - radius * ((theta + dtheta).cos() - theta.cos()),
            )
        };
        Pose {
            x,
            y,
            heading: Rad(theta + dtheta).normalize().value(),
        }
    }

    /// 期望速度 → 左右轮目标角速度 `(left, right)`
    pub fn wheel_speeds(&self, velocity: Velocity) -> (DegPerSec, DegPerSec) {
        let half = velocity.w * self.wheel_separation / 2.0;
        let left = (velocity.v - half) / self.wheel_radius;
        let right = (velocity.v + half) / self.wheel_radius;
        (
            DegPerSec::from_rad_per_sec(left),
            DegPerSec::from_rad_per_sec(right),
        )
    }
}

impl From<&GeometryConfig> for DifferentialDrive {
    fn from(geometry: &GeometryConfig) -> Self {
        Self::from_config(geometry)
    }
}
