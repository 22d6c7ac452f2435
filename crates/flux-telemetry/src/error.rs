use thiserror::Error;
use tonic::Status;

use crate::session::SessionState;

/// 值编解码错误
///
/// 出现即说明设备与采集端的协议版本不匹配，不能继续输出数据。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("typed value carries no recognized variant")]
    MissingValue,
}

/// FLUX Telemetry 统一错误类型
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Notification queue closed")]
    QueueClosed,

    #[error("Session {session_id} cannot go from {from:?} to {to:?}")]
    SessionOrder {
        session_id: String,
        from: SessionState,
        to: SessionState,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, TelemetryError>;

impl TelemetryError {
    pub fn config(msg: impl Into<String>) -> Self {
        TelemetryError::Config(msg.into())
    }

    pub fn tls(msg: impl Into<String>) -> Self {
        TelemetryError::Tls(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        TelemetryError::Internal(msg.into())
    }
}

impl From<TelemetryError> for Status {
    fn from(err: TelemetryError) -> Self {
        match err {
            TelemetryError::SessionOrder { .. } => Status::failed_precondition(err.to_string()),
            TelemetryError::QueueClosed => Status::unavailable(err.to_string()),
            _ => Status::internal(err.to_string()),
        }
    }
}
