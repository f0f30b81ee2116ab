//! Response signing.
//!
//! Responses are signed with HMAC-SHA1 over a canonical string: each field
//! rendered as `name=value`, joined by `&` in the order given, with no
//! trailing separator. The tag is standard padded base64. Clients recompute
//! the same string from the lines they receive, so field order is part of
//! the contract.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Separator between canonical fields.
pub const FIELD_SEPARATOR: char = '&';

/// Builds the canonical string for a field sequence.
pub fn canonicalize(fields: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}

fn mac_for(fields: &[(&str, &str)], key: &[u8]) -> HmacSha1 {
    // infallible: HMAC hashes keys longer than a block and pads shorter ones
    let mut mac =
        <HmacSha1 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(canonicalize(fields).as_bytes());
    mac
}

/// Signs a field sequence. Deterministic for identical inputs.
pub fn sign(fields: &[(&str, &str)], key: &[u8]) -> String {
    STANDARD.encode(mac_for(fields, key).finalize().into_bytes())
}

/// Checks a tag against a field sequence in constant time.
pub fn verify(fields: &[(&str, &str)], key: &[u8], tag: &str) -> bool {
    let Ok(tag) = STANDARD.decode(tag) else {
        return false;
    };
    mac_for(fields, key).verify_slice(&tag).is_ok()
}
