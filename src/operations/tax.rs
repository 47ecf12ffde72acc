//! Tax remittance to the Kenya Revenue Authority.

use super::{Authorization, Operation, OperationKind, Signature};
use crate::errors::ValidationError;
use crate::types::{CommandId, ResponseEnvelope, Secret};
use crate::utils::{
    check_amount, check_len, check_required, check_short_code, check_url, MAX_REMARKS_LEN,
};
use serde::Serialize;

/// KRA's receiving short code.
pub const KRA_SHORT_CODE: u32 = 572572;

const ORGANISATION_IDENTIFIER_TYPE: &str = "4";

/// Remits tax from an organisation's account to KRA.
#[derive(Serialize, Debug, Clone)]
pub struct TaxRemittanceRequest {
    /// API operator username
    #[serde(rename = "Initiator")]
    pub initiator: String,

    /// Derived at dispatch
    #[serde(rename = "SecurityCredential")]
    pub security_credential: String,

    /// Always `PayTaxToKRA`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    #[serde(rename = "SenderIdentifierType")]
    sender_identifier_type: &'static str,

    #[serde(rename = "RecieverIdentifierType")]
    receiver_identifier_type: &'static str,

    /// Amount in whole shillings
    #[serde(rename = "Amount")]
    pub amount: u64,

    /// Paying short code
    #[serde(rename = "PartyA")]
    pub party_a: u32,

    /// Receiving short code, KRA by default
    #[serde(rename = "PartyB")]
    pub party_b: u32,

    /// Payment registration number issued by KRA
    #[serde(rename = "AccountReference")]
    pub account_reference: String,

    /// At most 100 characters
    #[serde(rename = "Remarks")]
    pub remarks: String,

    /// Notified on queue timeout
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_time_out_url: String,

    /// Receives the result
    #[serde(rename = "ResultURL")]
    pub result_url: String,

    /// Plaintext initiator password
    #[serde(skip)]
    pub initiator_password: Secret,
}

impl TaxRemittanceRequest {
    /// Creates a remittance to KRA.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initiator: impl Into<String>,
        initiator_password: impl Into<Secret>,
        amount: u64,
        party_a: u32,
        payment_registration_number: impl Into<String>,
        remarks: impl Into<String>,
        queue_time_out_url: impl Into<String>,
        result_url: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            security_credential: String::new(),
            command_id: CommandId::PayTaxToKra,
            sender_identifier_type: ORGANISATION_IDENTIFIER_TYPE,
            receiver_identifier_type: ORGANISATION_IDENTIFIER_TYPE,
            amount,
            party_a,
            party_b: KRA_SHORT_CODE,
            account_reference: payment_registration_number.into(),
            remarks: remarks.into(),
            queue_time_out_url: queue_time_out_url.into(),
            result_url: result_url.into(),
            initiator_password: initiator_password.into(),
        }
    }
}

impl Operation for TaxRemittanceRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::TaxRemittance
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_required(&self.initiator, "Initiator")?;
        check_amount(self.amount, "Amount")?;
        check_short_code(self.party_a, "PartyA")?;
        check_short_code(self.party_b, "PartyB")?;
        check_required(&self.account_reference, "AccountReference")?;
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
