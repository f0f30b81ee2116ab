//! Token validation.
//!
//! The gate decides whether a raw token is acceptable for a given device
//! record and, if so, what the record's counters should advance to. It
//! never writes anything: committing the advance is the key registry's job,
//! and the registry re-checks the ordering at commit time.

use crate::cipher;
use crate::device::{Advance, DeviceRecord};
use crate::error::GateFault;
use crate::modhex;
use crate::token::DecodedToken;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a decrypted block was judged not authentic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityFailure {
    /// The CRC does not match the payload.
    Checksum,
    /// The block decrypted cleanly but belongs to a different device.
    InternalId,
}

/// Reason a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    MalformedToken,
    IntegrityFailure(IntegrityFailure),
    ReplayedToken,
    DeviceDisabled,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MalformedToken => f.write_str("malformed token"),
            Rejection::IntegrityFailure(IntegrityFailure::Checksum) => {
                f.write_str("checksum mismatch")
            }
            Rejection::IntegrityFailure(IntegrityFailure::InternalId) => {
                f.write_str("internal id mismatch")
            }
            Rejection::ReplayedToken => f.write_str("replayed token"),
            Rejection::DeviceDisabled => f.write_str("device disabled"),
        }
    }
}

/// Result of one gate invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Accepted(Advance),
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }
}

/// Validates `raw` against `record`.
///
/// The caller must have looked `record` up by the token's public id prefix;
/// a prefix that does not match is a fault, not a rejection.
///
/// Checks run in this order: length, prefix, encoding, checksum, internal
/// id, active flag, counters. Integrity is checked before the active flag so
/// forged tokens against disabled devices are still reported as such.
pub fn validate(raw: &str, record: &DeviceRecord) -> Result<ValidationOutcome, GateFault> {
    let prefix_len = record.public_id.len();
    if raw.len() != prefix_len + modhex::ENCODED_BLOCK_LEN || !raw.is_char_boundary(prefix_len) {
        return Ok(ValidationOutcome::Rejected(Rejection::MalformedToken));
    }

    let (prefix, encoded) = raw.split_at(prefix_len);
    if prefix != record.public_id {
        return Err(GateFault::PrefixMismatch {
            prefix: prefix.to_string(),
            public_id: record.public_id.clone(),
        });
    }

    let Ok(block) = modhex::decode_block(encoded) else {
        return Ok(ValidationOutcome::Rejected(Rejection::MalformedToken));
    };

    let plaintext = cipher::decrypt_block(record.secret_key.as_bytes(), &block)?;
    let token = DecodedToken::parse(&plaintext);

    if !token.has_valid_checksum() {
        return Ok(ValidationOutcome::Rejected(Rejection::IntegrityFailure(
            IntegrityFailure::Checksum,
        )));
    }

    if token.internal_id != record.internal_id {
        return Ok(ValidationOutcome::Rejected(Rejection::IntegrityFailure(
            IntegrityFailure::InternalId,
        )));
    }

    if !record.active {
        return Ok(ValidationOutcome::Rejected(Rejection::DeviceDisabled));
    }

    let counters = token.counters();
    if counters <= record.counters {
        return Ok(ValidationOutcome::Rejected(Rejection::ReplayedToken));
    }

    Ok(ValidationOutcome::Accepted(Advance {
        counters,
        timestamp: token.timestamp,
    }))
}
