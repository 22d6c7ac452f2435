pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod session;
pub mod sink;
pub mod store;
pub mod tls;

pub use config::{ConfigLoader, LogFormat, LoggingConfig, TelemetryConfig};
pub use error::{CodecError, Result, TelemetryError};
pub use handlers::{subscription_request, TelemetryService};
pub use logging::init_logging;
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use pipeline::{NotificationPipeline, NotificationQueue};
pub use server::TelemetryServer;
pub use service::{CloudTelemetryService, InboundStream, OutboundStream};
pub use session::{SessionEvent, SessionState, SessionTracker};
pub use sink::{Fields, Metric, MetricBus, MetricsSink, SharedSink, Tags};
pub use store::{cloud_request_id, is_cloud_request_id, TelemetryStore, CLOUD_ID_PREFIX};
