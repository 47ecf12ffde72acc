//! Field validators shared by every operation.
//!
//! Each predicate is pure. The `check_*` helpers wrap a predicate and map a
//! failure to the [`ValidationError`] variant that names the offending field,
//! so operation validators can chain them with `?`.

use crate::errors::ValidationError;
use url::Url;

/// Smallest accepted short code (5 digits).
pub const MIN_SHORT_CODE: u32 = 10_000;

/// Largest accepted short code (7 digits).
pub const MAX_SHORT_CODE: u32 = 9_999_999;

/// Prefix every accepted phone number starts with.
pub const MSISDN_PREFIX: &str = "2547";

/// Length of an accepted phone number.
pub const MSISDN_LEN: usize = 12;

/// Provider limit for `Remarks` and `Occasion`.
pub const MAX_REMARKS_LEN: usize = 100;

/// Provider limit for `AccountReference`.
pub const MAX_ACCOUNT_REFERENCE_LEN: usize = 12;

/// Provider limit for `TransactionDesc`.
pub const MAX_TRANSACTION_DESC_LEN: usize = 13;

/// Checks whether a phone number is in `2547XXXXXXXX` form.
///
/// # Examples
///
/// ```
/// use mpesa_rs::utils::is_msisdn;
///
/// assert!(is_msisdn("254708374149"));
/// assert!(!is_msisdn("0708374149"));
/// assert!(!is_msisdn("25470837414x"));
/// ```
pub fn is_msisdn(phone: &str) -> bool {
    phone.len() == MSISDN_LEN
        && phone.starts_with(MSISDN_PREFIX)
        && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Checks whether a short code has 5 to 7 digits.
///
/// # Examples
///
/// ```
/// use mpesa_rs::utils::is_short_code;
///
/// assert!(is_short_code(174379));
/// assert!(!is_short_code(9999));
/// ```
pub fn is_short_code(code: u32) -> bool {
    (MIN_SHORT_CODE..=MAX_SHORT_CODE).contains(&code)
}

/// Checks a short code supplied as text, as in fields that may hold either
/// a short code or a phone number.
pub fn is_short_code_str(code: &str) -> bool {
    !code.is_empty()
        && code.bytes().all(|b| b.is_ascii_digit())
        && code.parse::<u32>().map(is_short_code).unwrap_or(false)
}

/// Checks that a URL is absolute, uses `http` or `https`, and has a host.
///
/// # Examples
///
/// ```
/// use mpesa_rs::utils::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/callback"));
/// assert!(!is_valid_url("ftp://example.com"));
/// assert!(!is_valid_url("https://"));
/// ```
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map(|h| !h.is_empty()).unwrap_or(false)
        }
        Err(_) => false,
    }
}

/// Checks that text is at most `max` characters long.
pub fn is_within_len(text: &str, max: usize) -> bool {
    text.chars().count() <= max
}

pub(crate) fn check_short_code(code: u32, field: &'static str) -> Result<(), ValidationError> {
    if is_short_code(code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidShortCode { field })
    }
}

pub(crate) fn check_msisdn(phone: &str, field: &'static str) -> Result<(), ValidationError> {
    if is_msisdn(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneNumber { field })
    }
}

pub(crate) fn check_url(raw: &str, field: &'static str) -> Result<(), ValidationError> {
    if is_valid_url(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl { field })
    }
}

pub(crate) fn check_len(
    text: &str,
    max: usize,
    field: &'static str,
) -> Result<(), ValidationError> {
    if is_within_len(text, max) {
        Ok(())
    } else {
        Err(ValidationError::FieldTooLong { field, max })
    }
}

pub(crate) fn check_required(text: &str, field: &'static str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

pub(crate) fn check_amount(amount: u64, field: &'static str) -> Result<(), ValidationError> {
    if amount >= 1 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { field })
    }
}
