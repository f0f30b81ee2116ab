//! Verdict status codes.
//!
//! The wire spellings are a compatibility surface with deployed clients;
//! they only appear through [`Status::as_str`] and the serde renames.

use crate::gate::Rejection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "MISSING_PARAMETER")]
    MissingParameter,
    #[serde(rename = "MALFORMED_OTP")]
    MalformedOtp,
    #[serde(rename = "NO_SUCH_CLIENT")]
    NoSuchClient,
    #[serde(rename = "NO_SUCH_DEVICE")]
    NoSuchDevice,
    #[serde(rename = "BAD_OTP")]
    BadOtp,
    #[serde(rename = "REPLAYED_OTP")]
    ReplayedOtp,
    #[serde(rename = "DISABLED_DEVICE")]
    DisabledDevice,
    #[serde(rename = "BACKEND_ERROR")]
    BackendError,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Ok,
        Status::MissingParameter,
        Status::MalformedOtp,
        Status::NoSuchClient,
        Status::NoSuchDevice,
        Status::BadOtp,
        Status::ReplayedOtp,
        Status::DisabledDevice,
        Status::BackendError,
    ];

    /// The wire spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::MissingParameter => "MISSING_PARAMETER",
            Status::MalformedOtp => "MALFORMED_OTP",
            Status::NoSuchClient => "NO_SUCH_CLIENT",
            Status::NoSuchDevice => "NO_SUCH_DEVICE",
            Status::BadOtp => "BAD_OTP",
            Status::ReplayedOtp => "REPLAYED_OTP",
            Status::DisabledDevice => "DISABLED_DEVICE",
            Status::BackendError => "BACKEND_ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl From<Rejection> for Status {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MalformedToken => Status::MalformedOtp,
            Rejection::IntegrityFailure(_) => Status::BadOtp,
            Rejection::ReplayedToken => Status::ReplayedOtp,
            Rejection::DeviceDisabled => Status::DisabledDevice,
        }
    }
}
