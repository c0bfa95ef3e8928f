//! Error types for StrandKV
//!
//! Provides a unified error type for all operations. A missing key is not an
//! error: lookups return `Ok(None)`.

use thiserror::Error;

use crate::codec::CodecError;

/// Result type alias using StrandError
pub type Result<T> = std::result::Result<T, StrandError>;

/// Unified error type for StrandKV operations
#[derive(Debug, Error)]
pub enum StrandError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Store handle is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Failed to encode value: {0}")]
    Encode(CodecError),

    #[error("Failed to decode stored bytes: {0}")]
    Decode(CodecError),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("Write rejected by engine: {0}")]
    Write(String),

    #[error("Engine error: {0}")]
    Engine(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Key and Invariant Violations
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StrandError {
    /// Returns true if the error was caused by using a closed handle
    pub fn is_closed(&self) -> bool {
        matches!(self, StrandError::Closed)
    }
}
