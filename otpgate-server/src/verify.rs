//! The token verification pipeline: syntax check, device lookup, gate,
//! commit.

use otpgate_core::{
    IntegrityFailure, PUBLIC_ID_LEN, Rejection, Status, TOKEN_LEN, ValidationOutcome, modhex,
    validate,
};
use otpgate_store::{KeyRegistry, StoreError};
use tracing::{debug, error, info, warn};

/// Verifies one token and commits its counters if it is fresh.
///
/// Every outcome, including internal faults, is turned into a status so a
/// single bad request never takes the service down. Faults are logged at
/// error level and reported as [`Status::BackendError`], never as a token
/// rejection.
pub fn verify_otp(devices: &dyn KeyRegistry, otp: &str) -> Status {
    if otp.len() != TOKEN_LEN || !modhex::is_modhex(otp) {
        debug!("Rejecting malformed token of length {}", otp.len());
        return Status::MalformedOtp;
    }
    let public_id = &otp[..PUBLIC_ID_LEN];

    let record = match devices.lookup(public_id) {
        Ok(record) => record,
        Err(StoreError::NotFound(_)) => {
            debug!("No device registered for {}", public_id);
            return Status::NoSuchDevice;
        }
        Err(e) => {
            error!("Device lookup failed for {}: {}", public_id, e);
            return Status::BackendError;
        }
    };

    let outcome = match validate(otp, &record) {
        Ok(outcome) => outcome,
        Err(fault) => {
            error!("Internal fault validating token for {}: {}", public_id, fault);
            return Status::BackendError;
        }
    };

    let advance = match outcome {
        ValidationOutcome::Accepted(advance) => advance,
        ValidationOutcome::Rejected(rejection) => {
            match rejection {
                Rejection::IntegrityFailure(IntegrityFailure::InternalId) => {
                    warn!("Token for {} decrypted to a foreign internal id", public_id)
                }
                Rejection::IntegrityFailure(IntegrityFailure::Checksum) => {
                    warn!("Token for {} failed its checksum", public_id)
                }
                Rejection::ReplayedToken => warn!(
                    "Replayed token for {} (stored counters {})",
                    public_id, record.counters
                ),
                Rejection::DeviceDisabled | Rejection::MalformedToken => {
                    debug!("Rejected token for {}: {}", public_id, rejection)
                }
            }
            return rejection.into();
        }
    };

    match devices.compare_and_advance(public_id, &advance) {
        Ok(()) => {
            info!("Accepted token for {} at {}", public_id, advance.counters);
            Status::Ok
        }
        Err(StoreError::StaleUpdate(_)) => {
            warn!(
                "Token for {} lost a concurrent commit at {}",
                public_id, advance.counters
            );
            Status::ReplayedOtp
        }
        Err(StoreError::Disabled(_)) => {
            warn!("Device {} was disabled before commit", public_id);
            Status::DisabledDevice
        }
        Err(StoreError::NotFound(_)) => {
            warn!("Device {} disappeared before commit", public_id);
            Status::NoSuchDevice
        }
        Err(e) => {
            error!("Failed to commit counters for {}: {}", public_id, e);
            Status::BackendError
        }
    }
}
