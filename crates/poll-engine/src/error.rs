use ble_transport::RadioError;
use plant_registry::StoreError;
use thiserror::Error;

/// Why one device produced no reading this cycle. Absorbed by the fetcher's
/// caller; never crosses into the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("moisture service not found")]
    ServiceNotFound,
    #[error("moisture characteristic not found")]
    CharacteristicNotFound,
    #[error("could not decode reading: {0}")]
    DecodeFailed(&'static str),
}

/// Why a whole cycle was skipped. Absorbed by the scheduler; the loop
/// continues on the next tick.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("scan failed: {0}")]
    Scan(#[from] RadioError),
    #[error("registry store failed: {0}")]
    Store(#[from] StoreError),
}
