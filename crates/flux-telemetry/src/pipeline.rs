use chrono::{TimeZone, Utc};
use flux_gnmi::subscribe_response::Response;
use flux_gnmi::{Notification, SubscribeResponse};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::codec::{format_path, format_update_value, join_path};
use crate::error::{Result, TelemetryError};
use crate::metrics::ServiceMetrics;
use crate::sink::{Fields, SharedSink, Tags};

/// 通知队列的生产端，可在多个流之间克隆
///
/// 队列满时 `enqueue` 会等待，把消费端的压力传回设备的接收循环。
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<SubscribeResponse>,
    metrics: ServiceMetrics,
}

impl NotificationQueue {
    pub async fn enqueue(&self, response: SubscribeResponse) -> Result<()> {
        self.sender
            .send(response)
            .await
            .map_err(|_| TelemetryError::QueueClosed)?;
        self.metrics.record_notification_enqueued();
        Ok(())
    }

    /// 队列剩余容量
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

/// 通知流水线：单消费者，按入队顺序解码并写入下游
pub struct NotificationPipeline {
    receiver: mpsc::Receiver<SubscribeResponse>,
    sink: SharedSink,
    pretty: bool,
    metrics: ServiceMetrics,
    shutdown: watch::Receiver<bool>,
}

/// 创建队列与对应的消费端
pub fn channel(
    capacity: usize,
    sink: SharedSink,
    pretty: bool,
    metrics: ServiceMetrics,
    shutdown: watch::Receiver<bool>,
) -> (NotificationQueue, NotificationPipeline) {
    let (sender, receiver) = mpsc::channel(capacity);
    let queue = NotificationQueue {
        sender,
        metrics: metrics.clone(),
    };
    let pipeline = NotificationPipeline {
        receiver,
        sink,
        pretty,
        metrics,
        shutdown,
    };
    (queue, pipeline)
}

impl NotificationPipeline {
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    /// 消费循环
    ///
    /// 收到关闭信号后先排空已入队的通知再退出。
    /// 解码遇到无法识别的值时立即停止并返回错误。
    pub async fn run(mut self) -> Result<()> {
        info!("Notification pipeline started");

        loop {
            tokio::select! {
                biased;

                item = self.receiver.recv() => match item {
                    Some(response) => self.process(response)?,
                    None => break,
                },
                _ = self.shutdown.changed() => {
                    while let Ok(response) = self.receiver.try_recv() {
                        self.process(response)?;
                    }
                    break;
                }
            }
        }

        info!("Notification pipeline stopped");
        Ok(())
    }

    fn process(&self, response: SubscribeResponse) -> Result<()> {
        match response.response {
            Some(Response::Update(notification)) => {
                let emitted = self.emit_notification(&notification).map_err(|e| {
                    error!("Notification pipeline halted on undecodable value: {}", e);
                    e
                })?;
                self.metrics.record_emitted(emitted as u64);
            }
            Some(Response::Error(err)) => {
                error!(
                    code = err.code,
                    message = %err.message,
                    "Subscribe notification error"
                );
                self.metrics.record_notification_error();
            }
            other => {
                error!(response = ?other, "Unexpected response notification type");
                self.metrics.record_notification_error();
            }
        }
        Ok(())
    }

    // 每个 (path, value) 产生一条记录；先全部解码，避免半条通知进入下游
    fn emit_notification(&self, notification: &Notification) -> Result<usize> {
        let timestamp = notification.timestamp.to_string();
        let time = format_time(notification.timestamp);
        let prefix = format_path(notification.prefix.as_ref());

        let mut records = Vec::with_capacity(notification.update.len());
        for update in &notification.update {
            let path = join_path(&prefix, &format_path(update.path.as_ref()));
            let values = format_update_value(update, self.pretty)?;
            records.push((path, values));
        }

        let rendered = json!({
            "timestamp": notification.timestamp,
            "time": time,
            "updates": records
                .iter()
                .map(|(path, values)| json!({ "Path": path, "values": values }))
                .collect::<Vec<_>>(),
        });
        info!("{}", rendered);

        let count = records.len();
        for (path, values) in records {
            let mut fields = Fields::new();
            fields.insert("timestamp".to_string(), json!(timestamp));
            fields.insert("time".to_string(), json!(time));
            fields.insert("Path".to_string(), json!(path));
            fields.insert("values".to_string(), json!(values));
            self.sink.emit("", fields, Tags::new());
        }

        debug!(records = count, "Notification emitted");
        Ok(count)
    }
}

/// 纳秒时间戳转可读时间，小数秒去掉末尾的 0，整秒时不带小数
pub fn format_time(timestamp_nanos: i64) -> String {
    let time = Utc.timestamp_nanos(timestamp_nanos);
    let mut out = time.format("%Y-%m-%d %H:%M:%S").to_string();

    let nanos = time.timestamp_subsec_nanos();
    if nanos > 0 {
        out.push('.');
        out.push_str(format!("{:09}", nanos).trim_end_matches('0'));
    }

    out.push_str(" +0000 UTC");
    out
}
