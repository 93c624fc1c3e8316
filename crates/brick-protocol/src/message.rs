//! 仿真器请求/应答消息
//!
//! 远程调用传输层本身不在本 crate 中实现，这里只定义双方交换的
//! 消息形状。`SimReply` 提供按期望类型解包的辅助方法，类型不符时
//! 返回 [`ProtocolError::UnexpectedReply`]。

use crate::ProtocolError;
use std::fmt;

/// 仿真场景中对象的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectHandle(pub i32);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 发往仿真器的请求
///
/// 关节相关的数值一律使用仿真器单位（弧度、弧度/秒）。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimRequest {
    /// 按名称查找对象句柄（如 "leftMotor0"）
    GetObjectHandle { name: String },
    SetJointTargetVelocity { handle: ObjectHandle, velocity: f64 },
    GetJointTargetVelocity { handle: ObjectHandle },
    GetJointPosition { handle: ObjectHandle },
    SetJointPosition { handle: ObjectHandle, position: f64 },
    CheckProximitySensor { handle: ObjectHandle },
    GetVisionSensorImage { handle: ObjectHandle, grayscale: bool },
    SetSynchronous { enabled: bool },
    StartSimulation,
    StopSimulation,
}

impl SimRequest {
    /// 请求名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            SimRequest::GetObjectHandle { .. } => "GetObjectHandle",
            SimRequest::SetJointTargetVelocity { .. } => "SetJointTargetVelocity",
            SimRequest::GetJointTargetVelocity { .. } => "GetJointTargetVelocity",
            SimRequest::GetJointPosition { .. } => "GetJointPosition",
            SimRequest::SetJointPosition { .. } => "SetJointPosition",
            SimRequest::CheckProximitySensor { .. } => "CheckProximitySensor",
            SimRequest::GetVisionSensorImage { .. } => "GetVisionSensorImage",
            SimRequest::SetSynchronous { .. } => "SetSynchronous",
            SimRequest::StartSimulation => "StartSimulation",
            SimRequest::StopSimulation => "StopSimulation",
        }
    }
}

/// 视觉传感器图像
///
/// `data` 为按行存储的 RGB（或灰度）字节，第 0 行是图像**底部**，
/// 与仿真器的坐标约定一致。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionImage {
    pub width: u32,
    pub height: u32,
    pub grayscale: bool,
    pub data: Vec<u8>,
}

impl VisionImage {
    /// 每像素字节数
    pub fn channels(&self) -> usize {
        if self.grayscale { 1 } else { 3 }
    }

    /// 校验数据长度与分辨率一致
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let expected = self.width as usize * self.height as usize * self.channels();
        if self.data.len() != expected {
            return Err(ProtocolError::InvalidImage {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// 仿真器应答
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimReply {
    Ack,
    Handle(ObjectHandle),
    Float(f64),
    /// 距离单位：米
    Proximity { detected: bool, distance: f64 },
    Image(VisionImage),
    /// 仿真器返回失败状态
    Failure { message: String },
}

impl SimReply {
    pub fn kind(&self) -> &'static str {
        match self {
            SimReply::Ack => "Ack",
            SimReply::Handle(_) => "Handle",
            SimReply::Float(_) => "Float",
            SimReply::Proximity { .. } => "Proximity",
            SimReply::Image(_) => "Image",
            SimReply::Failure { .. } => "Failure",
        }
    }

    fn unexpected(&self, expected: &'static str) -> ProtocolError {
        ProtocolError::UnexpectedReply {
            expected,
            actual: self.kind(),
        }
    }

    pub fn into_ack(self) -> Result<(), ProtocolError> {
        match self {
            SimReply::Ack => Ok(()),
            other => Err(other.unexpected("Ack")),
        }
    }

    pub fn into_handle(self) -> Result<ObjectHandle, ProtocolError> {
        match self {
            SimReply::Handle(handle) => Ok(handle),
            other => Err(other.unexpected("Handle")),
        }
    }

    pub fn into_float(self) -> Result<f64, ProtocolError> {
        match self {
            SimReply::Float(value) => Ok(value),
            other => Err(other.unexpected("Float")),
        }
    }

    /// 返回 `(detected, distance_m)`
    pub fn into_proximity(self) -> Result<(bool, f64), ProtocolError> {
        match self {
            SimReply::Proximity { detected, distance } => Ok((detected, distance)),
            other => Err(other.unexpected("Proximity")),
        }
    }

    pub fn into_image(self) -> Result<VisionImage, ProtocolError> {
        match self {
            SimReply::Image(image) => {
                image.validate()?;
                Ok(image)
            },
            other => Err(other.unexpected("Image")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_unpacking() {
        assert_eq!(SimReply::Handle(ObjectHandle(7)).into_handle().unwrap(), ObjectHandle(7));
        assert_eq!(SimReply::Float(1.5).into_float().unwrap(), 1.5);
        assert!(SimReply::Ack.into_ack().is_ok());
        assert_eq!(
            SimReply::Proximity {
                detected: true,
                distance: 0.3
            }
            .into_proximity()
            .unwrap(),
            (true, 0.3)
        );
    }

    #[test]
    fn test_reply_type_mismatch() {
        let err = SimReply::Ack.into_float().unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnexpectedReply {
                expected: "Float",
                actual: "Ack"
            }
        );
    }

    #[test]
    fn test_image_validation() {
        let image = VisionImage {
            width: 2,
            height: 2,
            grayscale: false,
            data: vec![0; 12],
        };
        assert!(SimReply::Image(image.clone()).into_image().is_ok());

        let short = VisionImage {
            data: vec![0; 11],
            ..image
        };
        assert_eq!(
            SimReply::Image(short).into_image().unwrap_err(),
            ProtocolError::InvalidImage {
                expected: 12,
                actual: 11
            }
        );

        let gray = VisionImage {
            width: 4,
            height: 1,
            grayscale: true,
            data: vec![255; 4],
        };
        assert_eq!(gray.channels(), 1);
        assert!(gray.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_request_wire_shape() {
        let request = SimRequest::SetJointTargetVelocity {
            handle: ObjectHandle(3),
            velocity: 1.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["SetJointTargetVelocity"]["handle"], 3);
        assert_eq!(json["SetJointTargetVelocity"]["velocity"], 1.0);

        let json = serde_json::to_string(&SimRequest::StartSimulation).unwrap();
        assert_eq!(json, "\"StartSimulation\"");
    }
}
