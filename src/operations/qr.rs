//! Dynamic QR code generation.

use super::{Operation, OperationKind};
use crate::errors::ValidationError;
use crate::types::{QrCodeResponse, TransactionCode};
use crate::utils::{check_amount, check_required};
use serde::Serialize;

/// Default image edge length in pixels.
pub const DEFAULT_QR_SIZE: &str = "300";

/// Generates a QR code customers can scan to pay.
///
/// Needs only the bearer token: no credential, no passkey.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct QrCodeRequest {
    /// Name shown to the customer
    pub merchant_name: String,

    /// Transaction reference
    pub ref_no: String,

    /// Amount in whole shillings
    pub amount: u64,

    /// Transaction type
    pub trx_code: TransactionCode,

    /// Credit party identifier: till, paybill, agent or phone number
    #[serde(rename = "CPI")]
    pub cpi: String,

    /// Image edge length in pixels
    pub size: String,
}

impl QrCodeRequest {
    /// Creates a QR request with the default size.
    pub fn new(
        merchant_name: impl Into<String>,
        ref_no: impl Into<String>,
        amount: u64,
        trx_code: TransactionCode,
        cpi: impl Into<String>,
    ) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            ref_no: ref_no.into(),
            amount,
            trx_code,
            cpi: cpi.into(),
            size: DEFAULT_QR_SIZE.to_string(),
        }
    }

    /// Sets the image size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.to_string();
        self
    }
}

impl Operation for QrCodeRequest {
    type Response = QrCodeResponse;

    fn kind(&self) -> OperationKind {
        OperationKind::QrCode
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_required(&self.merchant_name, "MerchantName")?;
        check_required(&self.ref_no, "RefNo")?;
        check_amount(self.amount, "Amount")?;
        check_required(&self.cpi, "CPI")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Authorization;

    fn qr() -> QrCodeRequest {
        QrCodeRequest::new(
            "TEST SUPERMARKET",
            "Invoice Test",
            1,
            TransactionCode::BuyGoods,
            "373132",
        )
    }

    #[test]
    fn test_qr_needs_no_authorization() {
        let request = qr();
        assert!(request.validate().is_ok());
        assert!(matches!(request.authorization(), Authorization::None));
    }

    #[test]
    fn test_qr_rule_order() {
        let mut request = qr();
        request.merchant_name = String::new();
        request.ref_no = " ".to_string();
        request.amount = 0;
        request.cpi = String::new();

        let expected = [
            ValidationError::MissingField { field: "MerchantName" },
            ValidationError::MissingField { field: "RefNo" },
            ValidationError::InvalidAmount { field: "Amount" },
            ValidationError::MissingField { field: "CPI" },
        ];

        let valid = qr();
        for (step, error) in expected.iter().enumerate() {
            assert_eq!(request.validate(), Err(*error), "step {step}");
            match step {
                0 => request.merchant_name = valid.merchant_name.clone(),
                1 => request.ref_no = valid.ref_no.clone(),
                2 => request.amount = valid.amount,
                _ => request.cpi = valid.cpi.clone(),
            }
        }
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_qr_wire_shape() {
        let request =
            QrCodeRequest::new("TEST", "INV-1", 50, TransactionCode::SendMoney, "254708374149")
                .with_size(400);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["MerchantName"], "TEST");
        assert_eq!(json["RefNo"], "INV-1");
        assert_eq!(json["TrxCode"], "SM");
        assert_eq!(json["CPI"], "254708374149");
        assert_eq!(json["Size"], "400");
    }
}
