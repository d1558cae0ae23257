//! Error types for the MiFlora sensor library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the sensor.
#[derive(Error, Debug)]
pub enum Error {
    /// No Bluetooth adapter is available on this host.
    #[error("no Bluetooth adapter found")]
    NoAdapter,

    /// The connected device does not expose the expected GATT characteristic.
    #[error("characteristic {0} not found on device")]
    CharacteristicNotFound(uuid::Uuid),

    /// A characteristic returned fewer bytes than its fixed layout requires.
    #[error("short read from characteristic: expected at least {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Underlying Bluetooth stack error.
    #[error("Bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),
}
