//! Lipa na M-Pesa Online: STK push and its status query.

use super::{Authorization, Operation, OperationKind, Signature};
use crate::errors::ValidationError;
use crate::types::{CommandId, Secret, StkPushResponse, StkQueryResponse};
use crate::utils::{
    check_amount, check_len, check_msisdn, check_required, check_short_code, check_url,
    MAX_ACCOUNT_REFERENCE_LEN, MAX_TRANSACTION_DESC_LEN,
};
use serde::Serialize;

/// Prompts a customer's phone to authorize a payment.
///
/// `Password` and `Timestamp` are derived from the short code and passkey at
/// dispatch time.
///
/// # Examples
///
/// ```
/// use mpesa_rs::operations::{Operation, StkPushRequest};
/// use mpesa_rs::types::CommandId;
///
/// let request = StkPushRequest::new(
///     174379,
///     "passkey",
///     CommandId::CustomerPayBillOnline,
///     10,
///     "254708374149",
///     "https://example.com/callback",
///     "INV-001",
///     "Payment",
/// );
/// assert!(request.validate().is_ok());
/// ```
#[derive(Serialize, Debug, Clone)]
pub struct StkPushRequest {
    /// Paybill or till short code receiving the payment
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: u32,

    /// Derived at dispatch
    #[serde(rename = "Password")]
    pub password: String,

    /// Derived at dispatch
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// `CustomerPayBillOnline` or `CustomerBuyGoodsOnline`
    #[serde(rename = "TransactionType")]
    pub transaction_type: CommandId,

    /// Amount in whole shillings
    #[serde(rename = "Amount")]
    pub amount: u64,

    /// Phone number sending the money
    #[serde(rename = "PartyA")]
    pub party_a: String,

    /// Organisation receiving the money
    #[serde(rename = "PartyB")]
    pub party_b: u32,

    /// Phone number that receives the prompt
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,

    /// Where the provider posts the outcome
    #[serde(rename = "CallBackURL")]
    pub call_back_url: String,

    /// Shown to the customer, at most 12 characters
    #[serde(rename = "AccountReference")]
    pub account_reference: String,

    /// At most 13 characters
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,

    /// Lipa na M-Pesa Online passkey
    #[serde(skip)]
    pub passkey: Secret,
}

impl StkPushRequest {
    /// Creates a push where the payer is also the prompted phone and the
    /// receiving party is the business short code.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        business_short_code: u32,
        passkey: impl Into<Secret>,
        transaction_type: CommandId,
        amount: u64,
        phone_number: impl Into<String>,
        call_back_url: impl Into<String>,
        account_reference: impl Into<String>,
        transaction_desc: impl Into<String>,
    ) -> Self {
        let phone_number = phone_number.into();
        Self {
            business_short_code,
            password: String::new(),
            timestamp: String::new(),
            transaction_type,
            amount,
            party_a: phone_number.clone(),
            party_b: business_short_code,
            phone_number,
            call_back_url: call_back_url.into(),
            account_reference: account_reference.into(),
            transaction_desc: transaction_desc.into(),
            passkey: passkey.into(),
        }
    }

    /// Sets a receiving party different from the short code, e.g. a till.
    pub fn with_party_b(mut self, party_b: u32) -> Self {
        self.party_b = party_b;
        self
    }
}

impl Operation for StkPushRequest {
    type Response = StkPushResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::StkPush
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.kind().check_command_id(self.transaction_type)?;
        check_short_code(self.business_short_code, "BusinessShortCode")?;
        check_amount(self.amount, "Amount")?;
        check_msisdn(&self.party_a, "PartyA")?;
        check_short_code(self.party_b, "PartyB")?;
        check_msisdn(&self.phone_number, "PhoneNumber")?;
        check_url(&self.call_back_url, "CallBackURL")?;
        check_len(&self.account_reference, MAX_ACCOUNT_REFERENCE_LEN, "AccountReference")?;
        check_len(&self.transaction_desc, MAX_TRANSACTION_DESC_LEN, "TransactionDesc")
    }

    fn authorization(&self) -> Authorization<'_> {
        Authorization::Timestamp {
            short_code: self.business_short_code,
            passkey: self.passkey.expose(),
        }
    }

    fn authorize(&mut self, signature: Signature) {
        if let Signature::Timestamp(signed) = signature {
            self.password = signed.password;
            self.timestamp = signed.timestamp;
        }
    }
}

/// Queries the outcome of an earlier STK push.
#[derive(Serialize, Debug, Clone)]
pub struct StkQueryRequest {
    /// Short code the push was made for
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: u32,

    /// Derived at dispatch
    #[serde(rename = "Password")]
    pub password: String,

    /// Derived at dispatch
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// Identifier returned by the push
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,

    /// Lipa na M-Pesa Online passkey
    #[serde(skip)]
    pub passkey: Secret,
}

impl StkQueryRequest {
    /// Creates a query for `checkout_request_id`.
    pub fn new(
        business_short_code: u32,
        passkey: impl Into<Secret>,
        checkout_request_id: impl Into<String>,
    ) -> Self {
        Self {
            business_short_code,
            password: String::new(),
            timestamp: String::new(),
            checkout_request_id: checkout_request_id.into(),
            passkey: passkey.into(),
        }
    }
}

impl Operation for StkQueryRequest {
    type Response = StkQueryResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::StkQuery
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_short_code(self.business_short_code, "BusinessShortCode")?;
        check_required(&self.checkout_request_id, "CheckoutRequestID")
    }

    fn authorization(&self) -> Authorization<'_> {
        Authorization::Timestamp {
            short_code: self.business_short_code,
            passkey: self.passkey.expose(),
        }
    }

    fn authorize(&mut self, signature: Signature) {
        if let Signature::Timestamp(signed) = signature {
            self.password = signed.password;
            self.timestamp = signed.timestamp;
        }
    }
}
