use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// 采集服务计数器
#[derive(Clone)]
pub struct ServiceMetrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // 会话
    sessions_started: AtomicU64,
    sessions_terminated: AtomicU64,

    // 能力与订阅
    capabilities_registered: AtomicU64,
    capability_errors: AtomicU64,
    subscriptions_pushed: AtomicU64,
    unknown_request_ids: AtomicU64,

    // 通知流水线
    notifications_enqueued: AtomicU64,
    records_emitted: AtomicU64,
    notification_errors: AtomicU64,

    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                sessions_started: AtomicU64::new(0),
                sessions_terminated: AtomicU64::new(0),
                capabilities_registered: AtomicU64::new(0),
                capability_errors: AtomicU64::new(0),
                subscriptions_pushed: AtomicU64::new(0),
                unknown_request_ids: AtomicU64::new(0),
                notifications_enqueued: AtomicU64::new(0),
                records_emitted: AtomicU64::new(0),
                notification_errors: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    pub fn record_session_started(&self) {
        self.inner.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_terminated(&self) {
        self.inner.sessions_terminated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capability_registered(&self) {
        self.inner
            .capabilities_registered
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capability_error(&self) {
        self.inner.capability_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_subscription_pushed(&self) {
        self.inner.subscriptions_pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_request_id(&self) {
        self.inner.unknown_request_ids.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_enqueued(&self) {
        self.inner
            .notifications_enqueued
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self, records: u64) {
        self.inner
            .records_emitted
            .fetch_add(records, Ordering::Relaxed);
    }

    pub fn record_notification_error(&self) {
        self.inner.notification_errors.fetch_add(1, Ordering::Relaxed);
    }

    // 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_started: self.inner.sessions_started.load(Ordering::Relaxed),
            sessions_terminated: self.inner.sessions_terminated.load(Ordering::Relaxed),
            capabilities_registered: self.inner.capabilities_registered.load(Ordering::Relaxed),
            capability_errors: self.inner.capability_errors.load(Ordering::Relaxed),
            subscriptions_pushed: self.inner.subscriptions_pushed.load(Ordering::Relaxed),
            unknown_request_ids: self.inner.unknown_request_ids.load(Ordering::Relaxed),
            notifications_enqueued: self.inner.notifications_enqueued.load(Ordering::Relaxed),
            records_emitted: self.inner.records_emitted.load(Ordering::Relaxed),
            notification_errors: self.inner.notification_errors.load(Ordering::Relaxed),
            uptime_secs: self.inner.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 指标快照
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub sessions_started: u64,
    pub sessions_terminated: u64,
    pub capabilities_registered: u64,
    pub capability_errors: u64,
    pub subscriptions_pushed: u64,
    pub unknown_request_ids: u64,
    pub notifications_enqueued: u64,
    pub records_emitted: u64,
    pub notification_errors: u64,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ServiceMetrics::new();

        metrics.record_session_started();
        metrics.record_session_started();
        metrics.record_capability_registered();
        metrics.record_emitted(3);
        metrics.record_unknown_request_id();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sessions_started, 2);
        assert_eq!(snapshot.capabilities_registered, 1);
        assert_eq!(snapshot.records_emitted, 3);
        assert_eq!(snapshot.unknown_request_ids, 1);
        assert_eq!(snapshot.notification_errors, 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ServiceMetrics::new();
        let other = metrics.clone();
        other.record_notification_enqueued();
        assert_eq!(metrics.snapshot().notifications_enqueued, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(ServiceMetrics::new().snapshot()).unwrap();
        assert_eq!(json["sessions_started"], 0);
    }
}
