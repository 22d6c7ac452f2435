use rustls::ServerConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::TelemetryConfig;
use crate::error::{Result, TelemetryError};
use crate::handlers::TelemetryService;
use crate::metrics::ServiceMetrics;
use crate::pipeline;
use crate::session::SessionTracker;
use crate::sink::SharedSink;
use crate::store::TelemetryStore;
use crate::tls::{load_tls_config, TlsConfig};

/// 采集服务生命周期
///
/// 启动时创建存储、队列与唯一的流水线消费者；
/// 关闭时通知消费者排空队列并返回其结果。
pub struct TelemetryServer {
    config: TelemetryConfig,
    service: TelemetryService,
    tls: Option<Arc<ServerConfig>>,
    shutdown_tx: watch::Sender<bool>,
    pipeline: JoinHandle<Result<()>>,
}

impl TelemetryServer {
    pub async fn start(config: TelemetryConfig, sink: SharedSink) -> Result<Self> {
        config.validate()?;

        let tls = match TlsConfig::from_config(&config) {
            Some(tls_config) => {
                let tls = load_tls_config(&tls_config)?;
                info!(cert = %tls_config.cert_path, "TLS credentials loaded");
                Some(tls)
            }
            None => None,
        };

        let metrics = ServiceMetrics::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (queue, consumer) = pipeline::channel(
            config.queue_capacity,
            sink,
            config.prettyprint_json,
            metrics.clone(),
            shutdown_rx,
        );

        let service = TelemetryService::new(
            Arc::new(TelemetryStore::new()),
            Arc::new(SessionTracker::new(config.enforce_session_order)),
            queue,
            metrics,
        );

        let pipeline = consumer.spawn();

        info!(
            listen_address = %config.listen_address,
            tls = tls.is_some(),
            queue_capacity = config.queue_capacity,
            enforce_session_order = config.enforce_session_order,
            "Telemetry server started"
        );

        Ok(Self {
            config,
            service,
            tls,
            shutdown_tx,
            pipeline,
        })
    }

    /// 交给传输层的服务实现
    pub fn service(&self) -> TelemetryService {
        self.service.clone()
    }

    pub fn tls_config(&self) -> Option<Arc<ServerConfig>> {
        self.tls.clone()
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        self.service.metrics()
    }

    /// 流水线是否仍在运行
    pub fn is_running(&self) -> bool {
        !self.pipeline.is_finished()
    }

    /// 关闭服务，返回流水线的退出结果
    pub async fn shutdown(self) -> Result<()> {
        info!("Telemetry server shutting down");
        let _ = self.shutdown_tx.send(true);
        drop(self.service);

        let result = match self.pipeline.await {
            Ok(result) => result,
            Err(e) => Err(TelemetryError::internal(format!(
                "Notification pipeline task failed: {}",
                e
            ))),
        };

        if let Err(e) = &result {
            error!("Notification pipeline exited with error: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MetricBus;

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let config = TelemetryConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        let result = TelemetryServer::start(config, Arc::new(MetricBus::new(4))).await;
        assert!(matches!(result, Err(TelemetryError::Config(_))));
    }

    #[tokio::test]
    async fn test_start_fails_on_missing_tls_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = TelemetryConfig {
            tls_cert: Some(temp_dir.path().join("cert.pem").to_string_lossy().into_owned()),
            tls_key: Some(temp_dir.path().join("key.pem").to_string_lossy().into_owned()),
            ..Default::default()
        };
        let result = TelemetryServer::start(config, Arc::new(MetricBus::new(4))).await;
        assert!(matches!(result, Err(TelemetryError::Tls(_))));
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let server = TelemetryServer::start(TelemetryConfig::default(), Arc::new(MetricBus::new(4)))
            .await
            .unwrap();
        assert!(server.tls_config().is_none());
        assert!(server.is_running());
        server.shutdown().await.unwrap();
    }
}
