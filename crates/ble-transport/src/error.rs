use thiserror::Error;

pub type Result<T, E = RadioError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RadioError {
    #[error("radio adapter unavailable: {0}")]
    AdapterUnavailable(String),
    #[error("scan failed: {0}")]
    ScanFailed(String),
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("timeout")]
    Timeout,
    #[error("operation not supported on this backend: {0}")]
    Unsupported(&'static str),
}
