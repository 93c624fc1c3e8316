//! 设备层错误类型定义

use brick_protocol::ProtocolError;
use brick_tools::ConfigError;
use brick_transport::TransportError;
use thiserror::Error;

/// 设备层错误类型
///
/// 调用方可以通过 [`is_unavailable`](DeviceError::is_unavailable) 区分
/// "仿真器不可用"与"参数错误"两类问题。
#[derive(Error, Debug)]
pub enum DeviceError {
    /// 仿真器不可达、调用超时或返回失败状态
    #[error("Simulator unavailable: {0}")]
    Unavailable(TransportError),

    /// 端口上没有配置设备（先调用 `set_sensor_type`，或检查电机配置）
    #[error("{port} is not configured")]
    PortNotConfigured { port: &'static str },

    /// 端口掩码或端口名称非法
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// 仿真器返回了与请求不匹配的应答
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(ProtocolError),

    /// 配置不一致
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl DeviceError {
    /// 是否为"仿真器不可用"类错误
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DeviceError::Unavailable(_))
    }

    /// 是否为调用方的参数错误
    pub fn is_bad_argument(&self) -> bool {
        matches!(
            self,
            DeviceError::PortNotConfigured { .. } | DeviceError::InvalidPort(_)
        )
    }
}

impl From<TransportError> for DeviceError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Protocol(e) => DeviceError::UnexpectedReply(e),
            other => DeviceError::Unavailable(other),
        }
    }
}

impl From<ProtocolError> for DeviceError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidPortMask { .. } | ProtocolError::UnknownPortName(_) => {
                DeviceError::InvalidPort(err.to_string())
            },
            other => DeviceError::UnexpectedReply(other),
        }
    }
}
