//! Wire types shared across operations.
//!
//! Request bodies live next to their operation in [`crate::operations`]; this
//! module holds the closed value sets those requests draw from and the
//! response shapes the API returns.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Transaction command identifiers understood by the API.
///
/// Each operation accepts only a subset; see the operation's `validate`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// Paybill payment from a customer
    CustomerPayBillOnline,
    /// Till (Buy Goods) payment from a customer
    CustomerBuyGoodsOnline,
    /// Unsecured business payment to a customer
    BusinessPayment,
    /// Salary disbursement
    SalaryPayment,
    /// Promotional payment
    PromotionPayment,
    /// Reversal of a completed transaction
    TransactionReversal,
    /// Account balance enquiry
    AccountBalance,
    /// Transaction status enquiry
    TransactionStatusQuery,
    /// Tax remittance to the Kenya Revenue Authority
    #[serde(rename = "PayTaxToKRA")]
    PayTaxToKra,
}

impl CommandId {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::CustomerPayBillOnline => "CustomerPayBillOnline",
            CommandId::CustomerBuyGoodsOnline => "CustomerBuyGoodsOnline",
            CommandId::BusinessPayment => "BusinessPayment",
            CommandId::SalaryPayment => "SalaryPayment",
            CommandId::PromotionPayment => "PromotionPayment",
            CommandId::TransactionReversal => "TransactionReversal",
            CommandId::AccountBalance => "AccountBalance",
            CommandId::TransactionStatusQuery => "TransactionStatusQuery",
            CommandId::PayTaxToKra => "PayTaxToKRA",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of organisation or party identified by a `PartyA` value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierType {
    /// Phone number
    #[serde(rename = "1")]
    Msisdn,
    /// Till number
    #[serde(rename = "2")]
    TillNumber,
    /// Organisation short code
    #[serde(rename = "4")]
    ShortCode,
}

/// What the provider does when the validation URL is unreachable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Complete the transaction
    Completed,
    /// Cancel the transaction
    Cancelled,
}

/// Transaction type encoded in a dynamic QR code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCode {
    /// Pay merchant (Buy Goods)
    #[serde(rename = "BG")]
    BuyGoods,
    /// Withdraw cash at an agent till
    #[serde(rename = "WA")]
    WithdrawAtAgent,
    /// Paybill or business number
    #[serde(rename = "PB")]
    PayBill,
    /// Send money to a mobile number
    #[serde(rename = "SM")]
    SendMoney,
    /// Send to business
    #[serde(rename = "SB")]
    SendToBusiness,
}

/// Caller-supplied secret (passkey, initiator password). Never serialized
/// and redacted from `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// OAuth client-credentials token.
#[derive(Deserialize, Debug, Clone)]
pub struct BearerToken {
    /// The bearer token
    pub access_token: String,

    /// Validity in seconds, as sent by the provider (usually `"3599"`)
    #[serde(deserialize_with = "string_or_number")]
    pub expires_in: String,
}

impl BearerToken {
    /// Parses `expires_in`, if it is a whole number of seconds.
    pub fn expiry_seconds(&self) -> Option<u64> {
        self.expires_in.trim().parse().ok()
    }
}

/// Error body returned with any non-200 status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderErrorBody {
    /// Request identifier assigned by the provider
    #[serde(rename = "requestId", default)]
    pub request_id: String,

    /// Error code, e.g. `400.002.02`
    #[serde(rename = "errorCode")]
    pub error_code: String,

    /// Error description
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

/// Acknowledgement envelope shared by the asynchronous operations.
///
/// A `ResponseCode` of `"0"` means the request was accepted for processing;
/// the outcome is delivered later to the operation's result URL.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Unique request identifier assigned by the provider
    #[serde(
        rename = "OriginatorConversationID",
        alias = "OriginatorCoversationID",
        default
    )]
    pub originator_conversation_id: String,

    /// Unique transaction identifier assigned by the provider
    #[serde(rename = "ConversationID", default)]
    pub conversation_id: String,

    /// Status message
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: String,

    /// Status code, `"0"` on acceptance
    #[serde(rename = "ResponseCode", default)]
    pub response_code: String,
}

impl ResponseEnvelope {
    /// Whether the request was accepted.
    pub fn is_accepted(&self) -> bool {
        self.response_code == "0"
    }
}

/// Response to an STK push request.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushResponse {
    /// Merchant request identifier
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: String,

    /// Checkout identifier, used to query the request later
    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: String,

    /// Status code, `"0"` on acceptance
    #[serde(default)]
    pub response_code: String,

    /// Status message
    #[serde(default)]
    pub response_description: String,

    /// Message suitable for showing to the customer
    #[serde(default)]
    pub customer_message: String,
}

/// Response to an STK push status query.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct StkQueryResponse {
    /// Status code of the query itself
    #[serde(default)]
    pub response_code: String,

    /// Status message of the query itself
    #[serde(default)]
    pub response_description: String,

    /// Merchant request identifier
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: String,

    /// Checkout identifier
    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: String,

    /// Outcome of the payment, `"0"` when it succeeded
    #[serde(default, deserialize_with = "string_or_number")]
    pub result_code: String,

    /// Outcome description
    #[serde(default)]
    pub result_desc: String,
}

/// Response to a dynamic QR generation request.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct QrCodeResponse {
    /// Status code
    #[serde(default)]
    pub response_code: String,

    /// Request identifier
    #[serde(rename = "RequestID", default)]
    pub request_id: String,

    /// Status message
    #[serde(default)]
    pub response_description: String,

    /// Base64 encoded PNG of the QR code
    #[serde(rename = "QRCode", default)]
    pub qr_code: String,
}

// The provider is inconsistent about quoting numeric fields.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}
