//! Error types for the mpesa-rs library.
//!
//! Every failure in the request pipeline is returned by value to the caller of
//! the operation that produced it. Validation and credential failures are
//! closed enumerations so callers can match on the exact rule that failed.

use thiserror::Error;

/// Main error type for M-Pesa operations.
#[derive(Error, Debug)]
pub enum MpesaError {
    /// The request failed a field-format or business rule before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The security credential could not be produced
    #[error("Security credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Connection, TLS, timeout or body-read failure
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with a non-200 status and a structured error body
    #[error("Provider error {code} (request {request_id}): {message}")]
    Provider {
        /// Provider-assigned request identifier
        request_id: String,
        /// Provider error code, e.g. `400.002.02`
        code: String,
        /// Human-readable error message
        message: String,
    },

    /// A response body did not match the expected JSON shape
    #[error("Failed to decode response (status {status}): {source}")]
    Decode {
        /// HTTP status of the undecodable response
        status: u16,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Error while serializing a request body
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error detected at construction time
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for M-Pesa operations.
pub type Result<T> = std::result::Result<T, MpesaError>;

/// A violated request rule. Carries the wire name of the offending field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Command ID outside the operation's allowed set
    #[error("invalid command ID for {operation}")]
    InvalidCommandId {
        /// Operation whose allowed set was violated
        operation: &'static str,
    },

    /// Short code outside `[10000, 9999999]`
    #[error("{field} is not a valid short code")]
    InvalidShortCode {
        /// Offending field
        field: &'static str,
    },

    /// Phone number not in `2547XXXXXXXX` form
    #[error("{field} is not a valid phone number")]
    InvalidPhoneNumber {
        /// Offending field
        field: &'static str,
    },

    /// URL that is not absolute http(s) with a host
    #[error("{field} is not a valid http(s) URL")]
    InvalidUrl {
        /// Offending field
        field: &'static str,
    },

    /// Free text longer than the provider accepts
    #[error("{field} exceeds {max} characters")]
    FieldTooLong {
        /// Offending field
        field: &'static str,
        /// Maximum number of characters
        max: usize,
    },

    /// Required text field left empty
    #[error("{field} is required")]
    MissingField {
        /// Offending field
        field: &'static str,
    },

    /// Amount below the minimum of 1
    #[error("{field} must be at least 1")]
    InvalidAmount {
        /// Offending field
        field: &'static str,
    },
}

impl ValidationError {
    /// Returns the wire name of the field (or operation) that failed.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidCommandId { .. } => "CommandID",
            ValidationError::InvalidShortCode { field }
            | ValidationError::InvalidPhoneNumber { field }
            | ValidationError::InvalidUrl { field }
            | ValidationError::FieldTooLong { field, .. }
            | ValidationError::MissingField { field }
            | ValidationError::InvalidAmount { field } => field,
        }
    }
}

/// Failure while deriving a security credential.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The certificate could not be downloaded
    #[error("failed to fetch certificate: {0}")]
    Fetch(String),

    /// The certificate bytes are not a usable PEM block
    #[error("failed to decode PEM certificate: {0}")]
    PemDecode(String),

    /// The PEM payload is not a valid X.509 certificate
    #[error("failed to parse X.509 certificate: {0}")]
    CertificateParse(String),

    /// The certificate does not carry an RSA public key
    #[error("certificate public key is not RSA (algorithm {0})")]
    KeyType(String),

    /// The downloaded certificate does not match the pinned fingerprint
    #[error("certificate fingerprint mismatch: expected {expected}, got {actual}")]
    FingerprintMismatch {
        /// Pinned SHA-256 fingerprint (hex)
        expected: String,
        /// Fingerprint of the downloaded certificate (hex)
        actual: String,
    },

    /// RSA encryption failed
    #[error("failed to encrypt initiator secret: {0}")]
    Encryption(String),
}

impl From<rsa::Error> for CredentialError {
    fn from(err: rsa::Error) -> Self {
        CredentialError::Encryption(err.to_string())
    }
}
