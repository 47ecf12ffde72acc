//! The M-Pesa client and its operation dispatcher.
//!
//! Every call runs the same pipeline once, with no retries:
//!
//! 1. validate the request;
//! 2. derive a security credential or a timestamp/password pair, if the
//!    operation needs one;
//! 3. serialize the request;
//! 4. obtain a bearer token;
//! 5. send the request;
//! 6. decode the typed response, or surface the provider's error.

use crate::config::ClientConfig;
use crate::credential::{CertificateSource, CredentialEncoder, RemoteCertificate};
use crate::errors::Result;
use crate::operations::{
    AccountBalanceRequest, Authorization, B2cRequest, C2bRegisterUrlRequest, C2bSimulateRequest,
    Operation, QrCodeRequest, ReversalRequest, Signature, StkPushRequest, StkQueryRequest,
    TaxRemittanceRequest, TransactionStatusRequest,
};
use crate::signer;
use crate::transport::Transport;
use crate::types::{QrCodeResponse, ResponseEnvelope, StkPushResponse, StkQueryResponse};
use std::sync::Arc;
use tracing::debug;

/// Client for the M-Pesa API.
///
/// Cloning is cheap. Clones share configuration, connection pool and token
/// cache, and calls may run concurrently.
///
/// # Examples
///
/// ```no_run
/// use mpesa_rs::{ClientConfig, MpesaClient};
/// use mpesa_rs::operations::StkPushRequest;
/// use mpesa_rs::types::CommandId;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder("app-key", "app-secret").build()?;
/// let client = MpesaClient::new(config)?;
///
/// let response = client
///     .stk_push(StkPushRequest::new(
///         174379,
///         "passkey",
///         CommandId::CustomerPayBillOnline,
///         1,
///         "254708374149",
///         "https://example.com/callback",
///         "INV-001",
///         "Payment",
///     ))
///     .await?;
/// println!("checkout id: {}", response.checkout_request_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MpesaClient {
    config: Arc<ClientConfig>,
    transport: Transport,
    credentials: CredentialEncoder,
}

impl MpesaClient {
    /// Creates a client. Security credentials are encrypted under the
    /// certificate published for the configured environment.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let certificate = RemoteCertificate::new(
            transport.http().clone(),
            config.environment().certificate_url(),
        );

        Ok(Self {
            config: Arc::new(config),
            transport,
            credentials: CredentialEncoder::new(certificate),
        })
    }

    /// Loads the certificate from `source` instead of downloading it.
    pub fn with_certificate_source(mut self, source: impl CertificateSource + 'static) -> Self {
        self.credentials = self.credentials.with_source(source);
        self
    }

    /// Rejects any certificate whose DER SHA-256 is not `sha256_hex`.
    pub fn with_certificate_fingerprint(mut self, sha256_hex: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_fingerprint(sha256_hex);
        self
    }

    /// Routes every call, token fetch included, through a different API
    /// root. Meant for mock servers and egress proxies: the root is not
    /// checked against the two provider URLs.
    ///
    /// The configured base URL still selects the environment and the
    /// certificate.
    #[doc(hidden)]
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.transport = self.transport.with_base_url(api_root);
        self
    }

    /// The client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The client's transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Encrypts an initiator password into a security credential.
    pub async fn security_credential(&self, initiator_password: &str) -> Result<String> {
        Ok(self.credentials.encode(initiator_password).await?)
    }

    /// Runs the full request pipeline for one operation.
    pub async fn dispatch<O: Operation>(&self, mut operation: O) -> Result<O::Response> {
        let kind = operation.kind();

        debug!(operation = %kind, "validating request");
        operation.validate()?;

        let signature = match operation.authorization() {
            Authorization::None => None,
            Authorization::SecurityCredential { initiator_password } => {
                debug!(operation = %kind, "encoding security credential");
                let credential = self.credentials.encode(initiator_password).await?;
                Some(Signature::SecurityCredential(credential))
            }
            Authorization::Timestamp {
                short_code,
                passkey,
            } => {
                debug!(operation = %kind, "signing timestamp");
                Some(Signature::Timestamp(signer::sign_now(short_code, passkey)))
            }
        };
        if let Some(signature) = signature {
            operation.authorize(signature);
        }

        let body = serde_json::to_vec(&operation)?;
        debug!(operation = %kind, bytes = body.len(), "dispatching");

        self.transport.post(kind.path(), body).await
    }

    /// Sends an STK push prompt to the customer's phone.
    pub async fn stk_push(&self, request: StkPushRequest) -> Result<StkPushResponse> {
        self.dispatch(request).await
    }

    /// Queries the outcome of an STK push.
    pub async fn stk_query(&self, request: StkQueryRequest) -> Result<StkQueryResponse> {
        self.dispatch(request).await
    }

    /// Pays a customer from a short code.
    pub async fn b2c(&self, request: B2cRequest) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Requests an account balance.
    pub async fn account_balance(
        &self,
        request: AccountBalanceRequest,
    ) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Reverses a transaction.
    pub async fn reversal(&self, request: ReversalRequest) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Requests a transaction's status.
    pub async fn transaction_status(
        &self,
        request: TransactionStatusRequest,
    ) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Generates a dynamic payment QR code.
    pub async fn generate_qr(&self, request: QrCodeRequest) -> Result<QrCodeResponse> {
        self.dispatch(request).await
    }

    /// Remits tax to KRA.
    pub async fn remit_tax(&self, request: TaxRemittanceRequest) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Registers C2B confirmation and validation URLs.
    pub async fn register_c2b_urls(
        &self,
        request: C2bRegisterUrlRequest,
    ) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }

    /// Simulates a C2B payment (sandbox only).
    pub async fn simulate_c2b(&self, request: C2bSimulateRequest) -> Result<ResponseEnvelope> {
        self.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
    use crate::errors::{MpesaError, ValidationError};
    use crate::types::CommandId;

    fn client() -> MpesaClient {
        let config = ClientConfig::builder("key", "secret").build().unwrap();
        // unroutable: any network attempt fails
        MpesaClient::new(config).unwrap().with_api_root("http://127.0.0.1:9")
    }

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::builder("key", "secret")
            .with_base_url(PRODUCTION_BASE_URL)
            .build()
            .unwrap();
        let client = MpesaClient::new(config).unwrap();
        assert_eq!(client.config().environment(), Environment::Production);
        assert_eq!(client.transport().base_url(), PRODUCTION_BASE_URL);
    }

    #[test]
    fn test_api_root_keeps_configured_environment() {
        let client = client();
        assert_eq!(client.transport().base_url(), "http://127.0.0.1:9");
        assert_eq!(client.config().base_url(), SANDBOX_BASE_URL);
        assert_eq!(client.config().environment(), Environment::Sandbox);
    }

    #[tokio::test]
    async fn test_validation_fails_before_network() {
        let request = B2cRequest::new(
            "testapi",
            "password",
            CommandId::TransactionReversal,
            10,
            600996,
            "254708374149",
            "remarks",
            "https://example.com/queue",
            "https://example.com/result",
        );

        let err = client().b2c(request).await.unwrap_err();
        assert!(matches!(
            err,
            MpesaError::Validation(ValidationError::InvalidCommandId { operation: "b2c" })
        ));
    }
}
