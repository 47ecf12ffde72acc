//! Transaction reversal.

use super::{Authorization, Operation, OperationKind, Signature};
use crate::errors::ValidationError;
use crate::types::{CommandId, ResponseEnvelope, Secret};
use crate::utils::{
    check_amount, check_len, check_required, check_short_code, check_url, MAX_REMARKS_LEN,
};
use serde::Serialize;

/// Receiver identifier type the reversal API expects for an organisation.
pub const REVERSAL_RECEIVER_IDENTIFIER_TYPE: &str = "11";

/// Reverses a completed transaction.
#[derive(Serialize, Debug, Clone)]
pub struct ReversalRequest {
    /// API operator username
    #[serde(rename = "Initiator")]
    pub initiator: String,

    /// Derived at dispatch
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,

    /// Always `TransactionReversal`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    /// M-Pesa receipt number to reverse
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,

    /// Amount of the original transaction
    #[serde(rename = "Amount")]
    pub amount: u64,

    /// Organisation that received the original payment
    #[serde(rename = "ReceiverParty")]
    pub receiver_party: u32,

    // provider's spelling
    #[serde(rename = "RecieverIdentifierType")]
    receiver_identifier_type: &'static str,

    /// Receives the result
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

impl ReversalRequest {
    /// Creates a reversal. `Occasion` starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator: impl Into<String>,
        initiator_password: impl Into<Secret>,
        transaction_id: impl Into<String>,
        amount: u64,
        receiver_party: u32,
        remarks: impl Into<String>,
        queue_time_out_url: impl Into<String>,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            security_credential: String::new(),
            command_id: CommandId::TransactionReversal,
            transaction_id: transaction_id.into(),
            amount,
            receiver_party,
            receiver_identifier_type: REVERSAL_RECEIVER_IDENTIFIER_TYPE,
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

impl Operation for ReversalRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::Reversal
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_required(&self.initiator, "Initiator")?;
        check_required(&self.transaction_id, "TransactionID")?;
        check_amount(self.amount, "Amount")?;
        check_short_code(self.receiver_party, "ReceiverParty")?;
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
