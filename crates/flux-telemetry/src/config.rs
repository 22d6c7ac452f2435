use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TelemetryError};

/// 采集服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// 监听地址，由外部传输层使用
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// TLS 证书文件路径
    #[serde(default)]
    pub tls_cert: Option<String>,

    /// TLS 私钥文件路径
    #[serde(default)]
    pub tls_key: Option<String>,

    /// JSON 值是否缩进输出
    #[serde(default)]
    pub prettyprint_json: bool,

    /// 通知队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 拒绝乱序的会话调用
    #[serde(default)]
    pub enforce_session_order: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

// 默认值函数
fn default_listen_address() -> String {
    "0.0.0.0:50051".to_string()
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            tls_cert: None,
            tls_key: None,
            prettyprint_json: false,
            queue_capacity: default_queue_capacity(),
            enforce_session_order: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl TelemetryConfig {
    /// 证书和私钥需要同时配置
    pub fn tls_enabled(&self) -> bool {
        self.tls_cert.is_some() && self.tls_key.is_some()
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(TelemetryError::config("queue_capacity must be greater than 0"));
        }

        if self.tls_cert.is_some() != self.tls_key.is_some() {
            return Err(TelemetryError::config(
                "tls_cert and tls_key must be configured together",
            ));
        }

        if self.listen_address.is_empty() {
            return Err(TelemetryError::config("listen_address cannot be empty"));
        }

        Ok(())
    }
}

/// 配置加载器
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub const ENV_PREFIX: &'static str = "FLUX_TELEMETRY";

    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 加载配置，文件不存在时使用默认值，环境变量覆盖文件
    pub fn load(&self) -> Result<TelemetryConfig> {
        let mut builder = Config::builder();

        if self.path.exists() {
            let path = self
                .path
                .to_str()
                .ok_or_else(|| TelemetryError::config("Invalid config path"))?;
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TelemetryError::config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TelemetryError::config(e.to_string()))
    }

    /// 加载并验证
    pub fn load_validated(&self) -> Result<TelemetryConfig> {
        let config = self.load()?;
        config.validate()?;
        Ok(config)
    }
}
