//! Error types for the grass field

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Config error: {0}")]
    Config(String),

    /// A buffer would not fit the device. Fatal for the field.
    #[error("Resource exhausted: {label} needs {requested} bytes, device limit is {limit}")]
    ResourceExhausted {
        label: String,
        requested: u64,
        limit: u64,
    },

    /// The device ran out of memory below its advertised limits.
    #[error("Device out of memory allocating {label} ({requested} bytes planned)")]
    DeviceOutOfMemory {
        label: String,
        requested: u64,
    },

    #[error("Grass field is not active")]
    FieldInactive,

    #[error("No chunk at index {0}")]
    ChunkIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
