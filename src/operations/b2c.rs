//! Business to customer payouts.

use super::{Authorization, Operation, OperationKind, Signature};
use crate::errors::ValidationError;
use crate::types::{CommandId, ResponseEnvelope, Secret};
use crate::utils::{
    check_amount, check_len, check_msisdn, check_required, check_short_code, check_url,
    MAX_REMARKS_LEN,
};
use serde::Serialize;

/// Pays money from an organisation's short code to a customer's phone.
#[derive(Serialize, Debug, Clone)]
pub struct B2cRequest {
    /// API operator username
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,

    /// Derived at dispatch from `initiator_password`
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,

    /// `BusinessPayment`, `SalaryPayment` or `PromotionPayment`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    /// Amount in whole shillings
    #[serde(rename = "Amount")]
    pub amount: u64,

    /// Paying short code
    #[serde(rename = "PartyA")]
    pub party_a: u32,

    /// Receiving phone number
    #[serde(rename = "PartyB")]
    pub party_b: String,

    /// At most 100 characters
    #[serde(rename = "Remarks")]
    pub remarks: String,

    /// Notified when the request times out in the provider's queue
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_time_out_url: String,

    /// Receives the final result
    #[serde(rename = "ResultURL")]
    pub result_url: String,

    /// At most 100 characters
    #[serde(rename = "Occasion")]
    pub occasion: String,

    /// Plaintext initiator password
    #[serde(skip)]
    pub initiator_password: Secret,
}

impl B2cRequest {
    /// Creates a payout. `Occasion` starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator_name: impl Into<String>,
        initiator_password: impl Into<Secret>,
        command_id: CommandId,
        amount: u64,
        party_a: u32,
        party_b: impl Into<String>,
        remarks: impl Into<String>,
        queue_time_out_url: impl Into<String>,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator_name: initiator_name.into(),
            security_credential: String::new(),
            command_id,
            amount,
            party_a,
            party_b: party_b.into(),
            remarks: remarks.into(),
            queue_time_out_url: queue_time_out_url.into(),
            result_url: result_url.into(),
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

impl Operation for B2cRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::B2c
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_required(&self.initiator_name, "InitiatorName")?;
        check_amount(self.amount, "Amount")?;
        check_short_code(self.party_a, "PartyA")?;
        check_msisdn(&self.party_b, "PartyB")?;
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
