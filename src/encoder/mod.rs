//! Payload encoders: one struct per content kind, each producing the exact
//! string a phone's QR scanner expects.

mod contact;
mod otp;
mod vcard;
mod wifi;

pub use contact::{Email, Geo, Phone, Sms};
pub use otp::{clean_secret, current_code, validate_secret, Otp, OtpAlgorithm, OtpKind};
pub use vcard::VCard;
pub use wifi::{Wifi, WifiEncryption};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Anything that can be turned into a QR payload string.
pub trait Encode {
    fn encode(&self) -> String;
}

const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const PATH_SEGMENT: &AsciiSet = &QUERY
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Query-component escaping, space as `+`.
pub(crate) fn query_escape(s: &str) -> String {
    // '+' and '%' are themselves escaped, so a literal "%20" can only come from a space.
    utf8_percent_encode(s, QUERY).to_string().replace("%20", "+")
}

/// Path-segment escaping, space as `%20`.
pub(crate) fn path_escape(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}
