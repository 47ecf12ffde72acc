//! Security credential generation.
//!
//! Operations that move money on behalf of an organisation (B2C, balance,
//! reversal, transaction status, tax remittance) carry a `SecurityCredential`:
//! the initiator's plaintext password encrypted with RSA PKCS#1 v1.5 under the
//! provider's public certificate, then base64 encoded.
//!
//! PKCS#1 v1.5 padding is randomized, so two encodings of the same secret
//! never compare equal. Only decryption with the matching private key
//! recovers the input.

use crate::errors::CredentialError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

/// `rsaEncryption` (PKCS #1).
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Somewhere the provider's public certificate can be loaded from.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Returns the raw (PEM encoded) certificate bytes.
    async fn fetch(&self) -> Result<Vec<u8>, CredentialError>;
}

/// Downloads the certificate from a URL on every call.
#[derive(Clone, Debug)]
pub struct RemoteCertificate {
    http: reqwest::Client,
    url: String,
}

impl RemoteCertificate {
    /// Creates a source that fetches `url` with the given HTTP client.
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// The URL this source downloads from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CertificateSource for RemoteCertificate {
    async fn fetch(&self) -> Result<Vec<u8>, CredentialError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CredentialError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::Fetch(format!(
                "{} returned status {}",
                self.url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CredentialError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// A certificate held in memory, e.g. bundled with the application.
#[derive(Clone, Debug)]
pub struct StaticCertificate {
    pem: Vec<u8>,
}

impl StaticCertificate {
    /// Wraps PEM encoded certificate bytes.
    pub fn new(pem: impl Into<Vec<u8>>) -> Self {
        Self { pem: pem.into() }
    }
}

#[async_trait]
impl CertificateSource for StaticCertificate {
    async fn fetch(&self) -> Result<Vec<u8>, CredentialError> {
        Ok(self.pem.clone())
    }
}

/// Produces security credentials from a certificate source.
///
/// # Examples
///
/// ```no_run
/// use mpesa_rs::credential::{CredentialEncoder, StaticCertificate};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pem = std::fs::read("ProductionCertificate.cer")?;
/// let encoder = CredentialEncoder::new(StaticCertificate::new(pem));
/// let credential = encoder.encode("initiator-password").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CredentialEncoder {
    source: Arc<dyn CertificateSource>,
    fingerprint: Option<String>,
}

impl CredentialEncoder {
    /// Creates an encoder reading certificates from `source`.
    pub fn new(source: impl CertificateSource + 'static) -> Self {
        Self::from_source(Arc::new(source))
    }

    /// Creates an encoder from a shared source.
    pub fn from_source(source: Arc<dyn CertificateSource>) -> Self {
        Self {
            source,
            fingerprint: None,
        }
    }

    /// Replaces the certificate source, keeping any pinned fingerprint.
    pub fn with_source(mut self, source: impl CertificateSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Pins the SHA-256 fingerprint (hex) of the DER certificate.
    ///
    /// A fetched certificate with any other fingerprint is rejected before
    /// its key is used.
    pub fn with_fingerprint(mut self, sha256_hex: impl Into<String>) -> Self {
        self.fingerprint = Some(sha256_hex.into().to_ascii_lowercase());
        self
    }

    /// Fetches the certificate and extracts its RSA public key.
    pub async fn public_key(&self) -> Result<RsaPublicKey, CredentialError> {
        let pem = self.source.fetch().await?;
        public_key_from_pem(&pem, self.fingerprint.as_deref())
    }

    /// Encrypts `secret` under the provider certificate and base64 encodes it.
    pub async fn encode(&self, secret: &str) -> Result<String, CredentialError> {
        let key = self.public_key().await?;
        encrypt_secret(&key, secret)
    }
}

impl std::fmt::Debug for CredentialEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEncoder")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Returns the lowercase hex SHA-256 of DER certificate bytes.
pub fn certificate_fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

/// Decodes a PEM certificate and returns its RSA public key.
///
/// When `fingerprint` is given, the DER payload must hash to it.
pub fn public_key_from_pem(
    pem: &[u8],
    fingerprint: Option<&str>,
) -> Result<RsaPublicKey, CredentialError> {
    if pem.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CredentialError::PemDecode("empty certificate".to_string()));
    }

    let (_label, der) = x509_cert::der::pem::decode_vec(pem)
        .map_err(|e| CredentialError::PemDecode(e.to_string()))?;

    if let Some(expected) = fingerprint {
        let actual = certificate_fingerprint(&der);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(CredentialError::FingerprintMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    let cert = Certificate::from_der(&der)
        .map_err(|e| CredentialError::CertificateParse(e.to_string()))?;

    let spki = &cert.tbs_certificate.subject_public_key_info;
    if spki.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(CredentialError::KeyType(spki.algorithm.oid.to_string()));
    }

    let spki_der = spki
        .to_der()
        .map_err(|e| CredentialError::CertificateParse(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| CredentialError::CertificateParse(e.to_string()))
}

/// Encrypts `secret` with PKCS#1 v1.5 padding and base64 encodes the result.
pub fn encrypt_secret(key: &RsaPublicKey, secret: &str) -> Result<String, CredentialError> {
    let mut rng = rand::thread_rng();
    let ciphertext = key.encrypt(&mut rng, Pkcs1v15Encrypt, secret.as_bytes())?;
    Ok(BASE64.encode(ciphertext))
}
