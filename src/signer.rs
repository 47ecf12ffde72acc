//! Timestamp and password derivation for Lipa na M-Pesa Online (STK push).
//!
//! The provider expects `Timestamp` as `YYYYMMDDHHMMSS` and `Password` as
//! `base64(BusinessShortCode + Passkey + Timestamp)`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A timestamp together with the password derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTimestamp {
    /// `YYYYMMDDHHMMSS`
    pub timestamp: String,
    /// `base64(short_code ‖ passkey ‖ timestamp)`
    pub password: String,
}

/// Derives the timestamp and password for a given instant.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use mpesa_rs::signer::sign;
///
/// let now = NaiveDate::from_ymd_opt(2023, 9, 7)
///     .unwrap()
///     .and_hms_opt(19, 52, 44)
///     .unwrap();
/// let signed = sign(174379, "testkey", now);
/// assert_eq!(signed.timestamp, "20230907195244");
/// ```
pub fn sign(short_code: u32, passkey: &str, now: NaiveDateTime) -> SignedTimestamp {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let password = BASE64.encode(format!("{}{}{}", short_code, passkey, timestamp));
    SignedTimestamp {
        timestamp,
        password,
    }
}

/// Derives the timestamp and password for the current local time.
pub fn sign_now(short_code: u32, passkey: &str) -> SignedTimestamp {
    sign(short_code, passkey, Local::now().naive_local())
}
