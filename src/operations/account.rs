//! Account balance and transaction status enquiries.

use super::{Authorization, Operation, OperationKind, Signature};
use crate::errors::ValidationError;
use crate::types::{CommandId, IdentifierType, ResponseEnvelope, Secret};
use crate::utils::{
    check_len, check_msisdn, check_required, check_short_code, check_url, is_short_code_str,
    MAX_REMARKS_LEN,
};
use serde::Serialize;

/// Requests the balance of an organisation's account.
///
/// The balance arrives asynchronously at `ResultURL`.
#[derive(Serialize, Debug, Clone)]
pub struct AccountBalanceRequest {
    /// API operator username
    #[serde(rename = "Initiator")]
    pub initiator: String,

    /// Derived at dispatch
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,

    /// Always `AccountBalance`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    /// Short code being queried
    #[serde(rename = "PartyA")]
    pub party_a: u32,

    /// Kind of `PartyA`
    #[serde(rename = "IdentifierType")]
    pub identifier_type: IdentifierType,

    /// At most 100 characters
    #[serde(rename = "Remarks")]
    pub remarks: String,

    /// Notified on queue timeout
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_time_out_url: String,

    /// Receives the balance
    #[serde(rename = "ResultURL")]
    pub result_url: String,

    /// Plaintext initiator password
    #[serde(skip)]
    pub initiator_password: Secret,
}

impl AccountBalanceRequest {
    /// Creates a balance enquiry for a short code.
    pub fn new(
        initiator: impl Into<String>,
        initiator_password: impl Into<Secret>,
        party_a: u32,
        remarks: impl Into<String>,
        queue_time_out_url: impl Into<String>,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            security_credential: String::new(),
            command_id: CommandId::AccountBalance,
            party_a,
            identifier_type: IdentifierType::ShortCode,
            remarks: remarks.into(),
            queue_time_out_url: queue_time_out_url.into(),
            result_url: result_url.into(),
            initiator_password: initiator_password.into(),
        }
    }

    /// Sets the identifier type of `PartyA`.
    pub fn with_identifier_type(mut self, identifier_type: IdentifierType) -> Self {
        self.identifier_type = identifier_type;
        self
    }
}

impl Operation for AccountBalanceRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::AccountBalance
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_required(&self.initiator, "Initiator")?;
        check_short_code(self.party_a, "PartyA")?;
        check_len(&self.remarks, MAX_REMARKS_LEN, "Remarks")?;
        check_url(&self.queue_time_out_url, "QueueTimeOutURL")?;
        check_url(&self.result_url, "ResultURL")
    }

    fn authorization(&self) -> Authorization<'_> {
        Authorization::SecurityCredential {
            initiator_password: self.initiator_password.expose(),
        }
    }

    fn authorize(&mut self, signature: Signature) {
        if let Signature::SecurityCredential(credential) = signature {
            self.security_credential = credential;
        }
    }
}

/// Requests the status of a transaction.
#[derive(Serialize, Debug, Clone)]
pub struct TransactionStatusRequest {
    /// API operator username
    #[serde(rename = "Initiator")]
    pub initiator: String,

    /// Derived at dispatch
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,

    /// Always `TransactionStatusQuery`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    /// M-Pesa receipt number of the transaction
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,

    /// Phone number, till or short code, per `IdentifierType`
    #[serde(rename = "PartyA")]
    pub party_a: String,

    /// Kind of `PartyA`
    #[serde(rename = "IdentifierType")]
    pub identifier_type: IdentifierType,

    /// Receives the status
    #[serde(rename = "ResultURL")]
    pub result_url: String,

    /// Notified on queue timeout
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_time_out_url: String,

    /// At most 100 characters
    #[serde(rename = "Remarks")]
    pub remarks: String,

    /// At most 100 characters
    #[serde(rename = "Occasion")]
    pub occasion: String,

    /// Plaintext initiator password
    #[serde(skip)]
    pub initiator_password: Secret,
}

impl TransactionStatusRequest {
    /// Creates a status query. `Occasion` starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator: impl Into<String>,
        initiator_password: impl Into<Secret>,
        transaction_id: impl Into<String>,
        party_a: impl Into<String>,
        identifier_type: IdentifierType,
        remarks: impl Into<String>,
        queue_time_out_url: impl Into<String>,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            security_credential: String::new(),
            command_id: CommandId::TransactionStatusQuery,
            transaction_id: transaction_id.into(),
            party_a: party_a.into(),
            identifier_type,
            result_url: result_url.into(),
            queue_time_out_url: queue_time_out_url.into(),
            remarks: remarks.into(),
            occasion: String::new(),
            initiator_password: initiator_password.into(),
        }
    }

    /// Sets the occasion.
    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasion = occasion.into();
        self
    }
}

impl Operation for TransactionStatusRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::TransactionStatus
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_required(&self.initiator, "Initiator")?;
        check_required(&self.transaction_id, "TransactionID")?;
        match self.identifier_type {
            IdentifierType::Msisdn => check_msisdn(&self.party_a, "PartyA")?,
            IdentifierType::TillNumber | IdentifierType::ShortCode => {
                if !is_short_code_str(&self.party_a) {
                    return Err(ValidationError::InvalidShortCode { field: "PartyA" });
                }
            }
        }
        check_len(&self.remarks, MAX_REMARKS_LEN, "Remarks")?;
        check_url(&self.queue_time_out_url, "QueueTimeOutURL")?;
        check_url(&self.result_url, "ResultURL")?;
        check_len(&self.occasion, MAX_REMARKS_LEN, "Occasion")
    }

    fn authorization(&self) -> Authorization<'_> {
        Authorization::SecurityCredential {
            initiator_password: self.initiator_password.expose(),
        }
    }

    fn authorize(&mut self, signature: Signature) {
        if let Signature::SecurityCredential(credential) = signature {
            self.security_credential = credential;
        }
    }
}
