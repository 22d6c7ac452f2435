use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TelemetryError};

/// 设备会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    None,
    SessionInit,
    CapabilitiesRegistered,
    Streaming,
}

/// 驱动会话前进的协议事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    RegisterCapabilities,
    StreamNotifications,
}

impl SessionEvent {
    /// 事件正常完成后会话所处的阶段
    pub fn target(self) -> SessionState {
        match self {
            SessionEvent::Start => SessionState::SessionInit,
            SessionEvent::RegisterCapabilities => SessionState::CapabilitiesRegistered,
            SessionEvent::StreamNotifications => SessionState::Streaming,
        }
    }
}

impl SessionState {
    /// 转移表，`None` 表示该事件在当前阶段不合法
    pub fn on(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (_, Start) => Some(SessionInit),
            (SessionInit | CapabilitiesRegistered, RegisterCapabilities) => {
                Some(CapabilitiesRegistered)
            }
            // 流已建立后重新上报能力不回退阶段
            (Streaming, RegisterCapabilities) => Some(Streaming),
            (CapabilitiesRegistered | Streaming, StreamNotifications) => Some(Streaming),
            _ => Option::None,
        }
    }
}

/// 会话阶段跟踪器
///
/// 仅作关联参考：默认不拦截乱序调用，`enforce` 打开后才拒绝非法转移。
/// 每个出现过的会话 ID 都会留下一条记录，没有过期清理。
pub struct SessionTracker {
    states: DashMap<String, SessionState>,
    enforce: bool,
}

impl SessionTracker {
    pub fn new(enforce: bool) -> Self {
        Self {
            states: DashMap::new(),
            enforce,
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// 查询会话当前阶段，未知会话为 `SessionState::None`
    pub fn state(&self, session_id: &str) -> SessionState {
        self.states
            .get(session_id)
            .map(|s| *s)
            .unwrap_or(SessionState::None)
    }

    /// 按事件推进会话
    pub fn advance(&self, session_id: &str, event: SessionEvent) -> Result<SessionState> {
        let mut entry = self
            .states
            .entry(session_id.to_string())
            .or_insert(SessionState::None);
        let current = *entry;

        let next = match current.on(event) {
            Some(next) => next,
            None if self.enforce => {
                return Err(TelemetryError::SessionOrder {
                    session_id: session_id.to_string(),
                    from: current,
                    to: event.target(),
                });
            }
            None => {
                warn!(
                    session_id = %session_id,
                    from = ?current,
                    event = ?event,
                    "Out-of-order session event accepted"
                );
                event.target()
            }
        };

        *entry = next;
        debug!(session_id = %session_id, from = ?current, to = ?next, "Session advanced");
        Ok(next)
    }

    pub fn count(&self) -> usize {
        self.states.len()
    }
}
