//! 可重连的仿真器会话

use crate::{SimTransport, TransportError};
use brick_protocol::{ObjectHandle, SimReply, SimRequest, VisionImage};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 传输连接工厂
///
/// 会话在构建和 `reconnect()` 时调用 `connect()` 获取新的传输。
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn SimTransport>, TransportError>;
}

impl<F> Connector for F
where
    F: Fn() -> Result<Box<dyn SimTransport>, TransportError> + Send + Sync,
{
    fn connect(&self) -> Result<Box<dyn SimTransport>, TransportError> {
        self()
    }
}

/// 仿真器会话
///
/// 显式持有传输连接，而不是进程级的全局状态。`Failure` 应答在这里被
/// 转换为 [`TransportError::Status`]，上层只会看到成功应答或错误。
pub struct SimSession {
    connector: Arc<dyn Connector>,
    transport: Option<Box<dyn SimTransport>>,
    call_timeout: Duration,
}

impl SimSession {
    /// 默认单次调用超时
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

    /// 建立会话
    pub fn connect(
        connector: Arc<dyn Connector>,
        call_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut transport = connector.connect()?;
        transport.set_call_timeout(call_timeout);
        info!("Simulator session connected (call timeout {:?})", call_timeout);
        Ok(Self {
            connector,
            transport: Some(transport),
            call_timeout,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// 关闭旧连接并通过 connector 重新建立
    pub fn reconnect(&mut self) -> Result<(), TransportError> {
        self.disconnect();
        let mut transport = self.connector.connect()?;
        transport.set_call_timeout(self.call_timeout);
        self.transport = Some(transport);
        info!("Simulator session reconnected");
        Ok(())
    }

    /// 关闭连接；之后的调用返回 [`TransportError::NotConnected`]
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            debug!("Simulator session closed");
        }
    }

    /// 原始调用
    pub fn call(&mut self, request: SimRequest) -> Result<SimReply, TransportError> {
        let name = request.name();
        let transport = self.transport.as_mut().ok_or(TransportError::NotConnected)?;
        match transport.call(request)? {
            SimReply::Failure { message } => {
                warn!("Simulator rejected `{}`: {}", name, message);
                Err(TransportError::Status {
                    request: name,
                    message,
                })
            },
            reply => Ok(reply),
        }
    }

    pub fn get_object_handle(&mut self, name: &str) -> Result<ObjectHandle, TransportError> {
        let reply = self.call(SimRequest::GetObjectHandle {
            name: name.to_string(),
        })?;
        let handle = reply.into_handle()?;
        debug!("Resolved `{}` -> {}", name, handle);
        Ok(handle)
    }

    /// 设置关节目标速度（弧度/秒）
    pub fn set_joint_target_velocity(
        &mut self,
        handle: ObjectHandle,
        velocity: f64,
    ) -> Result<(), TransportError> {
        self.call(SimRequest::SetJointTargetVelocity { handle, velocity })?
            .into_ack()?;
        Ok(())
    }

    /// 读取关节目标速度（弧度/秒）
    pub fn get_joint_target_velocity(&mut self, handle: ObjectHandle) -> Result<f64, TransportError> {
        Ok(self
            .call(SimRequest::GetJointTargetVelocity { handle })?
            .into_float()?)
    }

    /// 读取关节位置（弧度）
    pub fn get_joint_position(&mut self, handle: ObjectHandle) -> Result<f64, TransportError> {
        Ok(self.call(SimRequest::GetJointPosition { handle })?.into_float()?)
    }

    /// 设置关节位置（弧度）
    pub fn set_joint_position(
        &mut self,
        handle: ObjectHandle,
        position: f64,
    ) -> Result<(), TransportError> {
        self.call(SimRequest::SetJointPosition { handle, position })?
            .into_ack()?;
        Ok(())
    }

    /// 返回 `(detected, distance_m)`
    pub fn check_proximity_sensor(
        &mut self,
        handle: ObjectHandle,
    ) -> Result<(bool, f64), TransportError> {
        Ok(self
            .call(SimRequest::CheckProximitySensor { handle })?
            .into_proximity()?)
    }

    pub fn get_vision_sensor_image(
        &mut self,
        handle: ObjectHandle,
        grayscale: bool,
    ) -> Result<VisionImage, TransportError> {
        Ok(self
            .call(SimRequest::GetVisionSensorImage { handle, grayscale })?
            .into_image()?)
    }

    pub fn set_synchronous(&mut self, enabled: bool) -> Result<(), TransportError> {
        self.call(SimRequest::SetSynchronous { enabled })?.into_ack()?;
        Ok(())
    }

    pub fn start_simulation(&mut self) -> Result<(), TransportError> {
        self.call(SimRequest::StartSimulation)?.into_ack()?;
        Ok(())
    }

    pub fn stop_simulation(&mut self) -> Result<(), TransportError> {
        self.call(SimRequest::StopSimulation)?.into_ack()?;
        Ok(())
    }
}

impl fmt::Debug for SimSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimSession")
            .field("connected", &self.is_connected())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl Drop for SimSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}
