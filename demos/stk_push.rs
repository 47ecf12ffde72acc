//! Example STK push against the sandbox.
//!
//! Sends a payment prompt to a phone, then queries its status.
//!
//! Run with:
//! ```bash
//! cargo run --example stk_push
//! ```
//!
//! Environment variables (a `.env` file is read too):
//! - MPESA_APP_KEY, MPESA_APP_SECRET: Daraja app credentials
//! - MPESA_BASE_URL: optional, defaults to the sandbox
//! - MPESA_PASSKEY: Lipa na M-Pesa Online passkey
//! - MPESA_PHONE: phone to prompt, e.g. 254708374149
//! - MPESA_CALLBACK_URL: where the outcome is posted

use mpesa_rs::operations::{StkPushRequest, StkQueryRequest};
use mpesa_rs::{ClientConfig, CommandId, MpesaClient, MpesaError};

const SANDBOX_SHORT_CODE: u32 = 174379;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;
    let client = MpesaClient::new(config)?;

    let passkey = std::env::var("MPESA_PASSKEY")?;
    let phone = std::env::var("MPESA_PHONE").unwrap_or_else(|_| "254708374149".to_string());
    let callback = std::env::var("MPESA_CALLBACK_URL")
        .unwrap_or_else(|_| "https://example.com/mpesa/callback".to_string());

    println!("Prompting {} via {}", phone, client.config().base_url());

    let request = StkPushRequest::new(
        SANDBOX_SHORT_CODE,
        passkey.as_str(),
        CommandId::CustomerPayBillOnline,
        1,
        phone,
        callback,
        "demo",
        "Demo payment",
    );

    let response = match client.stk_push(request).await {
        Ok(response) => response,
        Err(MpesaError::Provider { code, message, .. }) => {
            println!("Provider rejected the push: {} {}", code, message);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("Accepted: {}", response.customer_message);

    // give the customer a moment to respond
    tokio::time::sleep(std::time::Duration::from_secs(20)).await;

    let status = client
        .stk_query(StkQueryRequest::new(
            SANDBOX_SHORT_CODE,
            passkey.as_str(),
            response.checkout_request_id,
        ))
        .await?;
    println!("Result {}: {}", status.result_code, status.result_desc);

    Ok(())
}
