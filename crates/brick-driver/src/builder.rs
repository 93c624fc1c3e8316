//! Builder 模式实现
//!
//! 提供链式构造 `BrickPi` 实例的便捷方式。

use crate::{BrickPi, DeviceError};
use brick_tools::BrickConfig;
use brick_transport::{Connector, SimHandle};
use std::sync::Arc;
use tracing::info;

enum Backend {
    Connector(Arc<dyn Connector>),
    Handle(SimHandle),
}

/// BrickPi Builder（链式构造）
///
/// # Example
///
/// ```rust,ignore
/// use brick_driver::BrickPiBuilder;
/// use brick_transport::mock::MockSimulator;
///
/// let sim = MockSimulator::with_robot_scene(0);
/// let brick = BrickPiBuilder::new(sim.connector())
///     .config(Default::default())
///     .build()
///     .unwrap();
/// ```
pub struct BrickPiBuilder {
    backend: Backend,
    config: Option<BrickConfig>,
    start_simulation: bool,
}

impl BrickPiBuilder {
    /// 使用连接工厂建立新的会话
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            backend: Backend::Connector(connector),
            config: None,
            start_simulation: true,
        }
    }

    /// 复用已有的会话句柄（与其他设备共享同一把传输锁）
    pub fn with_handle(handle: SimHandle) -> Self {
        Self {
            backend: Backend::Handle(handle),
            config: None,
            start_simulation: true,
        }
    }

    /// 设置配置（可选，默认 `BrickConfig::default()`）
    pub fn config(mut self, config: BrickConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 构建后是否启动仿真（默认启动）
    pub fn start_simulation(mut self, start: bool) -> Self {
        self.start_simulation = start;
        self
    }

    /// 构建 BrickPi 实例
    ///
    /// 依次执行：校验配置、建立会话、解析电机、（可选）启动仿真。
    pub fn build(self) -> Result<BrickPi, DeviceError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let handle = match self.backend {
            Backend::Connector(connector) => {
                SimHandle::connect(connector, config.transport.call_timeout())?
            },
            Backend::Handle(handle) => handle,
        };

        let brick = BrickPi::attach(handle, config)?;
        if self.start_simulation {
            brick.start_simulation()?;
        }
        info!("BrickPi ready: {:?}", brick);
        Ok(brick)
    }
}
