//! Customer to business: URL registration and payment simulation.

use super::{Operation, OperationKind};
use crate::errors::ValidationError;
use crate::types::{CommandId, ResponseEnvelope, ResponseType};
use crate::utils::{check_amount, check_msisdn, check_short_code, check_url};
use serde::Serialize;

/// Registers where C2B confirmations and validations are delivered.
#[derive(Serialize, Debug, Clone)]
pub struct C2bRegisterUrlRequest {
    /// Organisation short code
    #[serde(rename = "ShortCode")]
    pub short_code: u32,

    /// Default action when the validation URL is unreachable
    #[serde(rename = "ResponseType")]
    pub response_type: ResponseType,

    /// Receives payment confirmations
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,

    /// Receives validation requests (when external validation is enabled)
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

impl C2bRegisterUrlRequest {
    /// Creates a registration request.
    pub fn new(
        short_code: u32,
        response_type: ResponseType,
        confirmation_url: impl Into<String>,
        validation_url: impl Into<String>,
    ) -> Self {
        Self {
            short_code,
            response_type,
            confirmation_url: confirmation_url.into(),
            validation_url: validation_url.into(),
        }
    }
}

impl Operation for C2bRegisterUrlRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::C2bRegisterUrl
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_short_code(self.short_code, "ShortCode")?;
        check_url(&self.confirmation_url, "ConfirmationURL")?;
        check_url(&self.validation_url, "ValidationURL")
    }
}

/// Simulates a customer paying a short code. Sandbox only.
#[derive(Serialize, Debug, Clone)]
pub struct C2bSimulateRequest {
    /// Receiving short code
    #[serde(rename = "ShortCode")]
    pub short_code: u32,

    /// `CustomerPayBillOnline` or `CustomerBuyGoodsOnline`
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,

    /// Amount in whole shillings
    #[serde(rename = "Amount")]
    pub amount: u64,

    /// Paying phone number
    #[serde(rename = "Msisdn")]
    pub msisdn: String,

    /// Account number, for paybill payments only
    #[serde(rename = "BillRefNumber", skip_serializing_if = "Option::is_none")]
    pub bill_ref_number: Option<String>,
}

impl C2bSimulateRequest {
    /// Creates a simulation without a bill reference.
    pub fn new(
        short_code: u32,
        command_id: CommandId,
        amount: u64,
        msisdn: impl Into<String>,
    ) -> Self {
        Self {
            short_code,
            command_id,
            amount,
            msisdn: msisdn.into(),
            bill_ref_number: None,
        }
    }

    /// Sets the paybill account number.
    pub fn with_bill_ref_number(mut self, bill_ref_number: impl Into<String>) -> Self {
        self.bill_ref_number = Some(bill_ref_number.into());
        self
    }
}

impl Operation for C2bSimulateRequest {
    type Response = ResponseEnvelope;

    fn kind(&self) -> OperationKind {
        OperationKind::C2bSimulate
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.command_id)?;
        check_short_code(self.short_code, "ShortCode")?;
        check_amount(self.amount, "Amount")?;
        check_msisdn(&self.msisdn, "Msisdn")
    }
}
