//! # mpesa-rs
//!
//! A typed async client for the Safaricom M-Pesa (Daraja) REST API.
//!
//! Every request goes through the same pipeline before anything reaches the
//! network: field and business-rule validation, then a security credential
//! or timestamp signature where the operation needs one, then an OAuth
//! bearer token, then the call itself.
//!
//! ## Features
//!
//! - **STK push**: prompt a customer to pay, and query the outcome
//! - **Disbursements**: B2C payments, reversals and tax remittance
//! - **Enquiries**: account balance and transaction status
//! - **C2B**: URL registration and sandbox simulation
//! - **Dynamic QR**: generate payment QR codes
//! - **Callbacks**: typed parsing of the payloads the provider posts back
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mpesa_rs::{ClientConfig, MpesaClient};
//! use mpesa_rs::operations::AccountBalanceRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder("app-key", "app-secret").build()?;
//! let client = MpesaClient::new(config)?;
//!
//! let ack = client
//!     .account_balance(AccountBalanceRequest::new(
//!         "testapi",
//!         "initiator-password",
//!         600984,
//!         "balance check",
//!         "https://example.com/timeout",
//!         "https://example.com/result",
//!     ))
//!     .await?;
//! println!("conversation: {}", ack.conversation_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environments
//!
//! Only the production (`https://api.safaricom.co.ke`) and sandbox
//! (`https://sandbox.safaricom.co.ke`) roots are accepted. The environment
//! also selects the certificate used for security credentials.
//!
//! ## Security
//!
//! - **Credentials**: initiator passwords are RSA-encrypted under the
//!   provider's X.509 certificate, which may be pinned by fingerprint
//! - **Secrets**: app secrets and passwords are redacted from `Debug` output
//! - **No retries**: a failed call is reported once and never replayed

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod callback;
pub mod client;
pub mod config;
pub mod credential;
pub mod errors;
pub mod operations;
pub mod signer;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use client::MpesaClient;
pub use config::{ClientConfig, Environment, TokenPolicy};
pub use errors::{CredentialError, MpesaError, Result, ValidationError};
pub use operations::{Operation, OperationKind};
pub use types::CommandId;
