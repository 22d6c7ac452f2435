use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type Fields = HashMap<String, Value>;
pub type Tags = HashMap<String, String>;

/// 下游指标接收端
///
/// 采集核心只调用 `emit`，measurement 为空、tags 为空。
pub trait MetricsSink: Send + Sync {
    fn emit(&self, measurement: &str, fields: Fields, tags: Tags);
}

/// 一条解码后的指标记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub measurement: String,
    pub fields: Fields,
    pub tags: Tags,
    /// 进入总线的时间（毫秒）
    pub received_at: i64,
}

impl Metric {
    pub fn new(measurement: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
            tags,
            received_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// 基于广播通道的指标总线
#[derive(Clone)]
pub struct MetricBus {
    sender: broadcast::Sender<Metric>,
}

impl MetricBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Metric> {
        self.sender.subscribe()
    }

    pub fn publish(&self, metric: Metric) -> Result<usize, broadcast::error::SendError<Metric>> {
        self.sender.send(metric)
    }
}

impl MetricsSink for MetricBus {
    fn emit(&self, measurement: &str, fields: Fields, tags: Tags) {
        if let Err(e) = self.publish(Metric::new(measurement, fields, tags)) {
            tracing::warn!("MetricBus has no subscriber, metric dropped: {}", e);
        }
    }
}

pub type SharedSink = Arc<dyn MetricsSink>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time::{timeout, Duration};

    fn fields(path: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("Path".to_string(), json!(path));
        fields
    }

    #[tokio::test]
    async fn test_bus_emit_reaches_subscriber() {
        let bus = MetricBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit("", fields("/a"), Tags::new());

        let metric = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for metric")
            .expect("Failed to receive metric");
        assert_eq!(metric.measurement, "");
        assert_eq!(metric.field_str("Path"), Some("/a"));
        assert!(metric.tags.is_empty());
    }

    #[tokio::test]
    async fn test_emit_without_subscriber_is_dropped() {
        let bus = MetricBus::new(10);
        // 没有订阅者时只记录日志，不 panic
        bus.emit("", fields("/a"), Tags::new());
        assert!(bus.publish(Metric::new("", fields("/b"), Tags::new())).is_err());
    }

    #[tokio::test]
    async fn test_bus_as_shared_sink() {
        let bus = MetricBus::new(10);
        let mut rx = bus.subscribe();
        let sink: SharedSink = Arc::new(bus.clone());

        sink.emit("", fields("/x"), Tags::new());
        sink.emit("", fields("/y"), Tags::new());

        assert_eq!(rx.recv().await.unwrap().field_str("Path"), Some("/x"));
        assert_eq!(rx.recv().await.unwrap().field_str("Path"), Some("/y"));
    }
}
