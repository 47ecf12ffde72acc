//! Operation definitions.
//!
//! Every API operation is a request type implementing [`Operation`]. The
//! dispatcher treats them uniformly: validate, derive the authorization
//! material the operation asks for, serialize, send, decode
//! [`Operation::Response`]. Adding an operation means adding one type and
//! one [`OperationKind`] variant.

pub mod account;
pub mod b2c;
pub mod c2b;
pub mod qr;
pub mod reversal;
pub mod stk;
pub mod tax;

pub use account::{AccountBalanceRequest, TransactionStatusRequest};
pub use b2c::B2cRequest;
pub use c2b::{C2bRegisterUrlRequest, C2bSimulateRequest};
pub use qr::QrCodeRequest;
pub use reversal::ReversalRequest;
pub use stk::{StkPushRequest, StkQueryRequest};
pub use tax::TaxRemittanceRequest;

use crate::errors::ValidationError;
use crate::signer::SignedTimestamp;
use crate::types::CommandId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Every operation the client can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Lipa na M-Pesa Online payment prompt
    StkPush,
    /// Status of an STK push
    StkQuery,
    /// Business to customer payout
    B2c,
    /// Account balance enquiry
    AccountBalance,
    /// Transaction reversal
    Reversal,
    /// Transaction status enquiry
    TransactionStatus,
    /// Dynamic QR code generation
    QrCode,
    /// Tax remittance to KRA
    TaxRemittance,
    /// C2B confirmation/validation URL registration
    C2bRegisterUrl,
    /// C2B payment simulation (sandbox)
    C2bSimulate,
}

impl OperationKind {
    /// Endpoint path relative to the API root.
    pub fn path(&self) -> &'static str {
        match self {
            OperationKind::StkPush => "mpesa/stkpush/v1/processrequest",
            OperationKind::StkQuery => "mpesa/stkpushquery/v1/query",
            OperationKind::B2c => "mpesa/b2c/v1/paymentrequest",
            OperationKind::AccountBalance => "mpesa/accountbalance/v1/query",
            OperationKind::Reversal => "mpesa/reversal/v1/request",
            OperationKind::TransactionStatus => "mpesa/transactionstatus/v1/query",
            OperationKind::QrCode => "mpesa/qrcode/v1/generate",
            OperationKind::TaxRemittance => "mpesa/b2b/v1/remittax",
            OperationKind::C2bRegisterUrl => "mpesa/c2b/v1/registerurl",
            OperationKind::C2bSimulate => "mpesa/c2b/v1/simulate",
        }
    }

    /// Short name used in errors and traces.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::StkPush => "stk_push",
            OperationKind::StkQuery => "stk_query",
            OperationKind::B2c => "b2c",
            OperationKind::AccountBalance => "account_balance",
            OperationKind::Reversal => "reversal",
            OperationKind::TransactionStatus => "transaction_status",
            OperationKind::QrCode => "qr_code",
            OperationKind::TaxRemittance => "tax_remittance",
            OperationKind::C2bRegisterUrl => "c2b_register_url",
            OperationKind::C2bSimulate => "c2b_simulate",
        }
    }

    /// Command IDs the operation accepts. Empty when it takes none.
    pub fn allowed_command_ids(&self) -> &'static [CommandId] {
        match self {
            OperationKind::StkPush | OperationKind::C2bSimulate => &[
                CommandId::CustomerPayBillOnline,
                CommandId::CustomerBuyGoodsOnline,
            ],
            OperationKind::B2c => &[
                CommandId::BusinessPayment,
                CommandId::SalaryPayment,
                CommandId::PromotionPayment,
            ],
            OperationKind::Reversal => &[CommandId::TransactionReversal],
            OperationKind::AccountBalance => &[CommandId::AccountBalance],
            OperationKind::TransactionStatus => &[CommandId::TransactionStatusQuery],
            OperationKind::TaxRemittance => &[CommandId::PayTaxToKra],
            OperationKind::StkQuery | OperationKind::QrCode | OperationKind::C2bRegisterUrl => &[],
        }
    }

    /// Fails with [`ValidationError::InvalidCommandId`] unless `command` is allowed.
    pub fn check_command_id(&self, command: CommandId) -> Result<(), ValidationError> {
        if self.allowed_command_ids().contains(&command) {
            Ok(())
        } else {
            Err(ValidationError::InvalidCommandId {
                operation: self.name(),
            })
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Material an operation needs derived before it is sent.
#[derive(Debug, Clone, Copy)]
pub enum Authorization<'a> {
    /// Bearer token only
    None,
    /// Encrypt the initiator password into a security credential
    SecurityCredential {
        /// Plaintext initiator password
        initiator_password: &'a str,
    },
    /// Derive `Timestamp` and `Password` from short code and passkey
    Timestamp {
        /// Business short code
        short_code: u32,
        /// Lipa na M-Pesa Online passkey
        passkey: &'a str,
    },
}

/// Derived authorization material, handed back to the operation.
#[derive(Debug, Clone)]
pub enum Signature {
    /// Base64 RSA-encrypted initiator password
    SecurityCredential(String),
    /// Timestamp and password pair
    Timestamp(SignedTimestamp),
}

/// A request the client can dispatch.
pub trait Operation: Serialize + Send + Sync {
    /// Decoded body of a 200 response.
    type Response: DeserializeOwned;

    /// Which operation this is.
    fn kind(&self) -> OperationKind;

    /// Checks the request's fields in a fixed order, returning the first
    /// violation.
    fn validate(&self) -> Result<(), ValidationError>;

    /// What must be derived before sending.
    fn authorization(&self) -> Authorization<'_> {
        Authorization::None
    }

    /// Stores derived material into the request body.
    fn authorize(&mut self, _signature: Signature) {}
}
