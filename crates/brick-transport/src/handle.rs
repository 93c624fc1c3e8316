//! 共享会话句柄
//!
//! 底层传输不支持交错的请求/应答，因此进程内所有设备调用（电机、
//! 传感器、相机）共用一把锁。一个 [`SimHandle`] 的所有克隆共享同一会话。

use crate::{Connector, SimSession, TransportError};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;

/// 仿真器会话句柄（可克隆，所有克隆共享同一把锁）
#[derive(Clone, Debug)]
pub struct SimHandle {
    session: Arc<Mutex<SimSession>>,
}

impl SimHandle {
    /// 建立会话并包装为共享句柄
    pub fn connect(
        connector: Arc<dyn Connector>,
        call_timeout: Duration,
    ) -> Result<Self, TransportError> {
        Ok(Self::from_session(SimSession::connect(connector, call_timeout)?))
    }

    pub fn from_session(session: SimSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// 获取全局传输锁
    ///
    /// 持有返回的 guard 期间，其他线程的设备调用全部阻塞。
    pub fn lock(&self) -> MutexGuard<'_, SimSession> {
        self.session.lock()
    }

    /// 在锁内执行一组调用
    pub fn with<R>(&self, f: impl FnOnce(&mut SimSession) -> R) -> R {
        let mut session = self.session.lock();
        f(&mut session)
    }

    /// 两个句柄是否指向同一会话
    pub fn same_session(&self, other: &SimHandle) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSimulator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_clones_share_session() {
        let sim = MockSimulator::new();
        let handle = SimHandle::connect(sim.connector(), Duration::from_secs(1)).unwrap();
        let clone = handle.clone();
        assert!(handle.same_session(&clone));

        clone.with(|s| s.disconnect());
        assert!(!handle.lock().is_connected());
    }

    #[test]
    fn test_calls_never_interleave() {
        let sim = MockSimulator::new();
        sim.add_joint("leftMotor0");
        sim.set_latency(Duration::from_millis(2));
        let handle = SimHandle::connect(sim.connector(), Duration::from_secs(1)).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        handle.with(|s| {
                            let h = s.get_object_handle("leftMotor0").unwrap();
                            s.get_joint_position(h).unwrap();
                        });
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(sim.max_in_flight(), 1);
        assert_eq!(sim.calls().len(), 40);
    }

    #[test]
    fn test_lock_blocks_other_callers() {
        let sim = MockSimulator::new();
        let handle = SimHandle::connect(sim.connector(), Duration::from_secs(1)).unwrap();
        let entered = Arc::new(AtomicUsize::new(0));

        let guard = handle.lock();
        let worker = {
            let handle = handle.clone();
            let entered = entered.clone();
            thread::spawn(move || {
                handle.with(|_| entered.fetch_add(1, Ordering::SeqCst));
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(entered.load(Ordering::SeqCst), 0);
        drop(guard);
        worker.join().unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }
}
