//! 强类型单位系统
//!
//! 仿真器以弧度工作，而 BrickPi 接口以角度（度）工作。
//! 使用 NewType 模式防止两者混用。
//!
//! # 示例
//!
//! ```rust
//! use brick_protocol::{Deg, Rad};
//!
//! let angle_rad = Rad(std::f64::consts::PI);
//! let angle_deg = angle_rad.to_deg();
//! assert!((angle_deg.0 - 180.0).abs() < 1e-6);
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// 弧度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rad(pub f64);

/// 角度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deg(pub f64);

/// 角速度（度/秒），电机目标速度的单位
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegPerSec(pub f64);

impl Rad {
    pub const ZERO: Self = Rad(0.0);

    /// 转换为角度
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0.to_degrees())
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// 归一化到 (-π, π] 范围
    pub fn normalize(self) -> Self {
        use std::f64::consts::{PI, TAU};
        let mut angle = self.0 % TAU;
        if angle > PI {
            angle -= TAU;
        } else if angle <= -PI {
            angle += TAU;
        }
        Rad(angle)
    }
}

impl Deg {
    pub const ZERO: Self = Deg(0.0);

    /// 转换为弧度
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0.to_radians())
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl DegPerSec {
    /// 转换为弧度/秒（仿真器关节速度单位）
    #[inline]
    pub fn to_rad_per_sec(self) -> f64 {
        self.0.to_radians()
    }

    #[inline]
    pub fn from_rad_per_sec(value: f64) -> Self {
        DegPerSec(value.to_degrees())
    }
}

impl fmt::Display for Rad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

impl fmt::Display for Deg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

impl fmt::Display for DegPerSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} dps", self.0)
    }
}

macro_rules! impl_linear_ops {
    ($ty:ident) => {
        impl Add for $ty {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                $ty(self.0 + rhs.0)
            }
        }

        impl Sub for $ty {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                $ty(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                $ty(self.0 * rhs)
            }
        }

        impl Neg for $ty {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                $ty(-self.0)
            }
        }
    };
}

impl_linear_ops!(Rad);
impl_linear_ops!(Deg);
impl_linear_ops!(DegPerSec);

impl From<f64> for DegPerSec {
    fn from(value: f64) -> Self {
        DegPerSec(value)
    }
}
