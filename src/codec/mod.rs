//! Codec Module
//!
//! Converts typed values to and from the raw bytes handed to the engine.
//!
//! ## Contract
//! - `encode` and `decode` are deterministic pure functions of their input
//! - `decode(encode(v))` is NOT required to equal `v` (normalizing or
//!   transforming codecs are allowed)
//! - `decode` fails on structurally invalid bytes, it never falls back to a
//!   default value
//!
//! ## Built-in Codecs
//! - UTF-8 text: `str` / `String` (invalid UTF-8 fails to decode)
//! - Raw bytes, identity: `[u8]` / `Vec<u8>` / `bytes::Bytes`
//!
//! Any other type opts in by implementing [`Encode`] and [`Decode`] itself.

mod raw;
mod text;

use thiserror::Error;

/// Errors raised by a codec
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed value: {0}")]
    Malformed(String),
}

/// A value that can be turned into stored bytes
///
/// Object safe, so a batch can carry values of different types.
pub trait Encode {
    fn encode(&self) -> Result<Vec<u8>, CodecError>;
}

/// A value that can be rebuilt from stored bytes
pub trait Decode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        (**self).encode()
    }
}
