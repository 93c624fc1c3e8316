//! # Brick Protocol
//!
//! BrickPi 风格控制器与仿真器之间的协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ports`: 电机/传感器端口位标志及掩码分解
//! - `sensor`: 传感器类型与读数
//! - `units`: 强类型角度单位
//! - `message`: 与仿真器交换的请求/应答消息
//!
//! ## 端口编码
//!
//! 电机端口 `PORT_A..PORT_D` 与传感器端口 `PORT_1..PORT_4` 各自占用
//! 一个比特位（0x01, 0x02, 0x04, 0x08），调用方可以按位或组合多个端口。

pub mod message;
pub mod ports;
pub mod sensor;
pub mod units;

// 重新导出常用类型
pub use message::{ObjectHandle, SimReply, SimRequest, VisionImage};
pub use ports::*;
pub use sensor::{SensorKind, SensorValue};
pub use units::{Deg, DegPerSec, Rad};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 端口掩码包含未定义的比特位
    #[error("Invalid port mask: 0x{mask:02X}")]
    InvalidPortMask { mask: u8 },

    /// 端口名称无法识别（配置文件中的 "PORT_B" 之类）
    #[error("Unknown port name: {0}")]
    UnknownPortName(String),

    /// 应答类型与请求不匹配
    #[error("Unexpected reply: expected {expected}, got {actual}")]
    UnexpectedReply {
        expected: &'static str,
        actual: &'static str,
    },

    /// 图像数据长度与分辨率不符
    #[error("Invalid image payload: expected {expected} bytes, got {actual}")]
    InvalidImage { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidPortMask { mask: 0x30 };
        assert_eq!(format!("{}", err), "Invalid port mask: 0x30");

        let err = ProtocolError::UnknownPortName("PORT_Z".to_string());
        assert!(format!("{}", err).contains("PORT_Z"));

        let err = ProtocolError::UnexpectedReply {
            expected: "Handle",
            actual: "Ack",
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Handle") && msg.contains("Ack"));
    }
}
