use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Result, TelemetryError};

/// 构造过滤器：RUST_LOG 优先，其次配置中的级别
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志
///
/// 进程内只能成功一次，重复调用返回错误。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::internal(format!("Failed to init logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_error() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        // 全局 subscriber 已存在
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_filter_falls_back_on_bad_level() {
        let config = LoggingConfig {
            level: "not a level ===".to_string(),
            ..Default::default()
        };
        // 不 panic
        let _ = env_filter(&config);
    }
}
