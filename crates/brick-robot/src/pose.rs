//! 位姿与速度

use std::fmt;

/// 平面位姿（米，弧度）
///
/// 航向角始终归一化到 (-π, π]。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub const ORIGIN: Self = Pose {
        x: 0.0,
        y: 0.0,
        heading: 0.0,
    };

    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// 与另一位姿的平面距离
    pub fn distance_to(&self, other: &Pose) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 3]> for Pose {
    fn from([x, y, heading]: [f64; 3]) -> Self {
        Self { x, y, heading }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x = {:.3} m, y = {:.3} m, th = {:.1}°",
            self.x,
            self.y,
            self.heading.to_degrees()
        )
    }
}

/// 线速度 `v`（米/秒）与角速度 `w`（弧度/秒）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Velocity {
    pub v: f64,
    pub w: f64,
}

impl Velocity {
    pub const ZERO: Self = Velocity { v: 0.0, w: 0.0 };

    pub fn new(v: f64, w: f64) -> Self {
        Self { v, w }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_from_array() {
        let pose = Pose::from([1.0, 2.0, 0.5]);
        assert_eq!(pose, Pose::new(1.0, 2.0, 0.5));
        assert_eq!(Pose::default(), Pose::ORIGIN);
    }

    #[test]
    fn test_distance() {
        let a = Pose::new(0.0, 0.0, 0.0);
        let b = Pose::new(3.0, 4.0, 1.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let pose = Pose::new(1.0, -0.5, std::f64::consts::FRAC_PI_2);
        assert_eq!(format!("{}", pose), "x = 1.000 m, y = -0.500 m, th = 90.0°");
    }
}
