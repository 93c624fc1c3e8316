//! 传感器类型与读数

use std::fmt;

/// 传感器类型（仿真桥实际支持的子集）
///
/// 多个 BrickPi 类型映射到同一种仿真行为：
/// - `NxtUltrasonic` / `Ev3UltrasonicCm` → 超声波测距
/// - `NxtLightOn` / `NxtLightOff` → 光线传感器（仿真中没有辅助光源，两者相同）
/// - `Custom` → 陀螺仪
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    /// 触碰传感器（仿真中未实现，恒为 0）
    Touch,
    NxtUltrasonic,
    Ev3UltrasonicCm,
    NxtLightOn,
    NxtLightOff,
    /// 自定义传感器，当前为陀螺仪
    Custom,
}

impl SensorKind {
    /// 是否为超声波类型
    pub fn is_ultrasonic(self) -> bool {
        matches!(self, SensorKind::NxtUltrasonic | SensorKind::Ev3UltrasonicCm)
    }

    /// 是否为光线类型
    pub fn is_light(self) -> bool {
        matches!(self, SensorKind::NxtLightOn | SensorKind::NxtLightOff)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Touch => "TOUCH",
            SensorKind::NxtUltrasonic => "NXT_ULTRASONIC",
            SensorKind::Ev3UltrasonicCm => "EV3_ULTRASONIC_CM",
            SensorKind::NxtLightOn => "NXT_LIGHT_ON",
            SensorKind::NxtLightOff => "NXT_LIGHT_OFF",
            SensorKind::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

/// 传感器读数
///
/// 大多数传感器返回单个数值，`Custom`（陀螺仪）返回一个列表。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorValue {
    Scalar(f64),
    List(Vec<f64>),
}

impl SensorValue {
    /// 单值读数；列表读数返回第一个元素
    pub fn first(&self) -> Option<f64> {
        match self {
            SensorValue::Scalar(v) => Some(*v),
            SensorValue::List(values) => values.first().copied(),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SensorValue::Scalar(v) => Some(*v),
            SensorValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[f64]> {
        match self {
            SensorValue::Scalar(_) => None,
            SensorValue::List(values) => Some(values),
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Scalar(v) => write!(f, "{v}"),
            SensorValue::List(values) => write!(f, "{values:?}"),
        }
    }
}
