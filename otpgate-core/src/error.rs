//! Error types for the token pipeline.

use thiserror::Error;

/// Errors produced while decoding modhex text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A character outside the modhex alphabet.
    #[error("invalid modhex character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// Two characters are needed per byte.
    #[error("odd modhex length: {0}")]
    OddLength(usize),

    /// Decoded to the wrong number of bytes for a token block.
    #[error("invalid block length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Errors from the block cipher adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The device key is not an AES-128 key.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

/// Internal-consistency faults raised by the gate.
///
/// These are never the result of attacker input: they mean a collaborator
/// handed the gate inconsistent data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateFault {
    /// The token prefix does not name the record it was validated against.
    #[error("token prefix {prefix:?} does not match record public id {public_id:?}")]
    PrefixMismatch { prefix: String, public_id: String },

    /// The stored device key could not be used.
    #[error("cipher fault: {0}")]
    Cipher(#[from] CipherError),
}
