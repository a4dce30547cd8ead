/// 运行时状态 (Runtime state)
///
/// 取代原型里散落的全局布尔标志:
/// - ConnectionState: 显式连接状态机 Disconnected → Connecting → Connected → Disconnected
/// - CancelToken:     传给采集与渲染两个循环的统一停止信号
/// - SourceEvent:     采集线程 → 渲染线程的生命周期事件
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// 设备连接状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    /// 合法迁移: Disconnected→Connecting→Connected→Disconnected,
    /// 以及 Connecting→Disconnected (连接失败)
    fn can_transition(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }
}

/// 跨线程共享的连接状态
#[derive(Clone, Default)]
pub struct Lifecycle {
    state: Arc<AtomicU8>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 执行一次状态迁移, 非法迁移被拒绝并返回 false
    pub fn transition(&self, next: ConnectionState) -> bool {
        let current = self.state();
        if current == next {
            return true; // 幂等
        }
        if !current.can_transition(next) {
            log::warn!("拒绝非法状态迁移: {:?} → {:?}", current, next);
            return false;
        }
        self.state.store(next as u8, Ordering::Release);
        log::info!("连接状态: {:?} → {:?}", current, next);
        true
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// 停止信号 (克隆后分发给各循环)
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// 采集线程生命周期事件 (crossbeam 通道投递给渲染线程)
#[derive(Clone, Debug)]
pub enum SourceEvent {
    Connected,
    Disconnected,
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_trips_once() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        token.cancel(); // 重复取消无害
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_lifecycle_legal_path() {
        let lc = Lifecycle::new();
        assert_eq!(lc.state(), ConnectionState::Disconnected);
        assert!(lc.transition(ConnectionState::Connecting));
        assert!(lc.transition(ConnectionState::Connected));
        assert!(lc.is_connected());
        assert!(lc.transition(ConnectionState::Disconnected));
        assert_eq!(lc.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_lifecycle_rejects_illegal_jump() {
        let lc = Lifecycle::new();
        // 不能直接跳到 Connected
        assert!(!lc.transition(ConnectionState::Connected));
        assert_eq!(lc.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_lifecycle_connect_failure_path() {
        let lc = Lifecycle::new();
        assert!(lc.transition(ConnectionState::Connecting));
        assert!(lc.transition(ConnectionState::Disconnected));
    }

    #[test]
    fn test_lifecycle_transition_is_idempotent() {
        let lc = Lifecycle::new();
        lc.transition(ConnectionState::Connecting);
        assert!(lc.transition(ConnectionState::Connecting));
    }
}
