//! Heart-rate error types.

use thiserror::Error;

/// Errors that can occur while talking to a sensor or decoding its data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeartRateError {
    /// The measurement payload had no bytes at all.
    #[error("heart rate measurement is empty")]
    EmptyPayload,

    /// The flag byte announced more bytes than the payload carries.
    #[error("heart rate measurement truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// No Bluetooth adapter is present.
    #[error("no bluetooth adapter found")]
    NoAdapter,

    /// A connection was attempted before a sensor was discovered.
    #[error("no heart rate sensor discovered")]
    NoSensor,

    /// The sensor does not expose the measurement characteristic.
    #[error("sensor has no heart rate measurement characteristic")]
    MissingCharacteristic,

    /// The Bluetooth stack reported an error.
    #[error("bluetooth error: {0}")]
    Bluetooth(String),
}
