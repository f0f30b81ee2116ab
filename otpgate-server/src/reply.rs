//! Response assembly.
//!
//! A reply is a sequence of `key=value` lines, each terminated by `\n`:
//! `nonce`, the echoed token, `status`, `t`, and optionally `h`, the
//! signature over the four preceding fields in that order.

use crate::config::TokenField;
use chrono::{DateTime, SecondsFormat, Utc};
use otpgate_core::{Status, signer};
use otpgate_store::MacKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub nonce: String,
    pub otp: String,
    pub status: Status,
    /// RFC 3339, UTC, second precision.
    pub timestamp: String,
    pub signature: Option<String>,
    token_field: TokenField,
}

impl Reply {
    pub fn new(
        token_field: TokenField,
        nonce: impl Into<String>,
        otp: impl Into<String>,
        status: Status,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            nonce: nonce.into(),
            otp: otp.into(),
            status,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            signature: None,
            token_field,
        }
    }

    /// The signed fields, in wire order.
    pub fn fields(&self) -> [(&str, &str); 4] {
        [
            ("nonce", self.nonce.as_str()),
            (self.token_field.as_str(), self.otp.as_str()),
            ("status", self.status.as_str()),
            ("t", self.timestamp.as_str()),
        ]
    }

    /// Attaches the signature computed with the client's key.
    #[must_use]
    pub fn signed(mut self, key: &MacKey) -> Self {
        self.signature = Some(signer::sign(&self.fields(), key.as_bytes()));
        self
    }

    /// Renders the response body.
    pub fn render(&self) -> String {
        let mut body = String::new();
        for (name, value) in self.fields() {
            body.push_str(name);
            body.push('=');
            body.push_str(value);
            body.push('\n');
        }
        if let Some(signature) = &self.signature {
            body.push_str("h=");
            body.push_str(signature);
            body.push('\n');
        }
        body
    }
}
