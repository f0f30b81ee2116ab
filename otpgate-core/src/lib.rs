//! Core of the otpgate OTP validation service.
//!
//! This crate holds everything that is pure:
//! - Modhex codec for the token's text form
//! - Single-block AES-128 adapter
//! - Plaintext token layout and CRC-16 checksum
//! - The validation gate that decides accept/reject for a device record
//! - Response signing over canonical field sequences
//!
//! Nothing here performs I/O or holds shared state. Persisting counter
//! advances is left to `otpgate-store`.

pub mod cipher;
mod device;
mod error;
pub mod gate;
pub mod modhex;
pub mod signer;
mod status;
pub mod token;

pub use device::{Advance, Counters, DeviceRecord, SecretKey};
pub use error::{CipherError, CodecError, GateFault};
pub use gate::{IntegrityFailure, Rejection, ValidationOutcome, validate};
pub use status::{Status, UnknownStatus};
pub use token::{DecodedToken, PUBLIC_ID_LEN, TOKEN_LEN};
