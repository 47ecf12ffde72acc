//! Payloads the provider POSTs back to the caller's URLs.
//!
//! Asynchronous operations acknowledge immediately and deliver their outcome
//! later: STK push outcomes go to `CallBackURL`, B2C, balance, reversal,
//! status and tax outcomes go to `ResultURL`, and C2B payments go to the
//! registered confirmation and validation URLs.

use crate::errors::{MpesaError, Result};
use crate::types::string_or_number;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope of an STK push callback.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StkCallbackEnvelope {
    /// Wrapper object
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

/// Body of an STK push callback.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StkCallbackBody {
    /// The callback itself
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// Outcome of an STK push.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallback {
    /// Merchant request identifier from the push response
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,

    /// Checkout identifier from the push response
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,

    /// `0` on success
    pub result_code: i64,

    /// Outcome description
    pub result_desc: String,

    /// Present only on success
    #[serde(default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

impl StkCallback {
    /// Whether the customer completed the payment.
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Looks up a metadata item, e.g. `MpesaReceiptNumber`.
    pub fn metadata(&self, name: &str) -> Option<&Value> {
        self.callback_metadata
            .as_ref()?
            .item
            .iter()
            .find(|item| item.name == name)?
            .value
            .as_ref()
    }

    /// The M-Pesa receipt number of a successful payment.
    pub fn receipt_number(&self) -> Option<&str> {
        self.metadata("MpesaReceiptNumber")?.as_str()
    }
}

/// Named values attached to a successful STK callback.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CallbackMetadata {
    /// Items such as `Amount`, `MpesaReceiptNumber`, `PhoneNumber`
    #[serde(rename = "Item", default)]
    pub item: Vec<MetadataItem>,
}

/// One named callback value. Some items are sent without a value.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MetadataItem {
    /// Item name
    #[serde(rename = "Name")]
    pub name: String,

    /// Item value
    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

/// Envelope of a `ResultURL` delivery.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ResultEnvelope {
    /// The result itself
    #[serde(rename = "Result")]
    pub result: OperationResult,
}

/// Outcome of a B2C, balance, reversal, status or tax request.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct OperationResult {
    /// Result type, usually `0`
    #[serde(default)]
    pub result_type: i64,

    /// `0` on success
    pub result_code: i64,

    /// Outcome description
    pub result_desc: String,

    /// Matches the acknowledgement's originator conversation ID
    #[serde(rename = "OriginatorConversationID", default)]
    pub originator_conversation_id: String,

    /// Matches the acknowledgement's conversation ID
    #[serde(rename = "ConversationID", default)]
    pub conversation_id: String,

    /// M-Pesa receipt number
    #[serde(rename = "TransactionID", default)]
    pub transaction_id: String,

    /// Operation-specific values, on success
    #[serde(default)]
    pub result_parameters: Option<ResultParameters>,

    /// Echoed request data
    #[serde(default)]
    pub reference_data: Option<ReferenceData>,
}

impl OperationResult {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Looks up a result parameter, e.g. `TransactionAmount`.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.result_parameters
            .as_ref()?
            .result_parameter
            .iter()
            .find(|p| p.key == key)?
            .value
            .as_ref()
    }
}

/// Key/value pairs of a result. The provider sends a bare object when there
/// is only one.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ResultParameters {
    /// The parameters
    #[serde(rename = "ResultParameter", default, deserialize_with = "one_or_many")]
    pub result_parameter: Vec<KeyValue>,
}

/// Echoed request data.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ReferenceData {
    /// The items
    #[serde(rename = "ReferenceItem", default, deserialize_with = "one_or_many")]
    pub reference_item: Vec<KeyValue>,
}

/// A key with an optional value.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct KeyValue {
    /// Key
    #[serde(rename = "Key")]
    pub key: String,

    /// Value
    #[serde(rename = "Value", default)]
    pub value: Option<Value>,
}

/// Payment notification delivered to the C2B confirmation or validation URL.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct C2bPayment {
    /// e.g. `Pay Bill`
    #[serde(default)]
    pub transaction_type: String,

    /// M-Pesa receipt number
    #[serde(rename = "TransID")]
    pub trans_id: String,

    /// `YYYYMMDDHHMMSS`
    #[serde(default)]
    pub trans_time: String,

    /// Amount paid, as sent
    #[serde(deserialize_with = "string_or_number")]
    pub trans_amount: String,

    /// Receiving short code
    #[serde(deserialize_with = "string_or_number")]
    pub business_short_code: String,

    /// Account number entered by the customer
    #[serde(default)]
    pub bill_ref_number: String,

    /// Invoice number, if any
    #[serde(default)]
    pub invoice_number: String,

    /// Balance after the payment (confirmation only)
    #[serde(default)]
    pub org_account_balance: String,

    /// Identifier echoed from the validation response
    #[serde(rename = "ThirdPartyTransID", default)]
    pub third_party_trans_id: String,

    /// Paying phone number (masked in some environments)
    #[serde(rename = "MSISDN", default, deserialize_with = "string_or_number")]
    pub msisdn: String,

    /// Payer's first name
    #[serde(default)]
    pub first_name: String,

    /// Payer's middle name
    #[serde(default)]
    pub middle_name: String,

    /// Payer's last name
    #[serde(default)]
    pub last_name: String,
}

/// Reply to a C2B validation request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct C2bValidationResponse {
    /// `0` to accept, a `C2B000xx` code to reject
    pub result_code: String,

    /// Free text
    pub result_desc: String,
}

impl C2bValidationResponse {
    /// Accepts the payment.
    pub fn accept() -> Self {
        Self {
            result_code: "0".to_string(),
            result_desc: "Accepted".to_string(),
        }
    }

    /// Rejects the payment with a provider rejection code, e.g. `C2B00011`.
    pub fn reject(code: impl Into<String>) -> Self {
        Self {
            result_code: code.into(),
            result_desc: "Rejected".to_string(),
        }
    }
}

/// Parses an STK push callback body.
pub fn parse_stk_callback(body: &[u8]) -> Result<StkCallback> {
    let envelope: StkCallbackEnvelope = serde_json::from_slice(body).map_err(decode_error)?;
    Ok(envelope.body.stk_callback)
}

/// Parses a `ResultURL` body.
pub fn parse_result(body: &[u8]) -> Result<OperationResult> {
    let envelope: ResultEnvelope = serde_json::from_slice(body).map_err(decode_error)?;
    Ok(envelope.result)
}

/// Parses a C2B confirmation or validation body.
pub fn parse_c2b_payment(body: &[u8]) -> Result<C2bPayment> {
    serde_json::from_slice(body).map_err(decode_error)
}

fn decode_error(source: serde_json::Error) -> MpesaError {
    // callbacks arrive as inbound requests, not responses
    MpesaError::Decode { status: 0, source }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<KeyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(KeyValue),
        Many(Vec<KeyValue>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}
