//! # Brick Transport Layer
//!
//! 仿真器远程调用的抽象层。真正的 RPC 客户端由外部提供，本 crate 只定义：
//!
//! - [`SimTransport`]: 单次请求/应答的传输接口（非可重入）
//! - [`Connector`]: 创建新传输连接的工厂（用于重连）
//! - [`SimSession`]: 显式持有、可重连的会话，提供带类型的调用方法
//! - [`SimHandle`]: 进程内共享的会话句柄，所有调用经过**同一把锁**串行化
//! - [`mock`]: 内存中的仿真器（`mock` feature）

use brick_protocol::{ProtocolError, SimReply, SimRequest};
use std::time::Duration;
use thiserror::Error;

mod handle;
mod session;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use handle::SimHandle;
pub use session::{Connector, SimSession};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    /// 会话未连接（已调用 `disconnect()` 或从未成功连接）
    #[error("Simulator not connected")]
    NotConnected,

    /// 调用超时（仿真器无响应）
    #[error("Simulator call `{request}` timed out after {timeout:?}")]
    Timeout {
        request: &'static str,
        timeout: Duration,
    },

    /// 底层 IO 错误（仿真器未运行、连接被拒绝等）
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// 仿真器返回失败状态
    #[error("Simulator returned failure for `{request}`: {message}")]
    Status {
        request: &'static str,
        message: String,
    },

    /// 应答与请求不匹配
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl TransportError {
    /// 是否表示仿真器不可达（相对于参数或协议错误）
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            TransportError::NotConnected
                | TransportError::Timeout { .. }
                | TransportError::Io(_)
                | TransportError::Status { .. }
        )
    }
}

/// 单次请求/应答传输
///
/// 实现不要求可重入：调用方（[`SimHandle`]）保证同一时刻只有一个调用在途。
pub trait SimTransport: Send {
    /// 发送请求并阻塞等待应答
    fn call(&mut self, request: SimRequest) -> Result<SimReply, TransportError>;

    /// 设置单次调用超时；超时应返回 [`TransportError::Timeout`]
    fn set_call_timeout(&mut self, _timeout: Duration) {}

    /// 关闭连接（默认无操作）
    fn close(&mut self) {}
}

impl<T: SimTransport + ?Sized> SimTransport for Box<T> {
    fn call(&mut self, request: SimRequest) -> Result<SimReply, TransportError> {
        (**self).call(request)
    }

    fn set_call_timeout(&mut self, timeout: Duration) {
        (**self).set_call_timeout(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::NotConnected;
        assert_eq!(format!("{}", err), "Simulator not connected");

        let err = TransportError::Timeout {
            request: "GetJointPosition",
            timeout: Duration::from_millis(50),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("GetJointPosition") && msg.contains("50ms"));

        let err = TransportError::Status {
            request: "GetObjectHandle",
            message: "object does not exist".to_string(),
        };
        assert!(format!("{}", err).contains("object does not exist"));
    }

    #[test]
    fn test_unreachable_classification() {
        assert!(TransportError::NotConnected.is_unreachable());
        assert!(
            TransportError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
                .is_unreachable()
        );
        let protocol = TransportError::Protocol(ProtocolError::UnexpectedReply {
            expected: "Float",
            actual: "Ack",
        });
        assert!(!protocol.is_unreachable());
    }
}
