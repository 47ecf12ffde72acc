//! Example account balance request.
//!
//! The balance itself is delivered asynchronously to the result URL; this
//! prints the acknowledgement.
//!
//! Run with:
//! ```bash
//! cargo run --example account_balance
//! ```
//!
//! Environment variables (a `.env` file is read too):
//! - MPESA_APP_KEY, MPESA_APP_SECRET: Daraja app credentials
//! - MPESA_BASE_URL: optional, defaults to the sandbox
//! - MPESA_INITIATOR, MPESA_INITIATOR_PASSWORD: API operator credentials
//! - MPESA_SHORT_CODE: organisation short code
//! - MPESA_RESULT_URL: where the balance is posted

use mpesa_rs::operations::AccountBalanceRequest;
use mpesa_rs::{ClientConfig, MpesaClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = MpesaClient::new(ClientConfig::from_env()?)?;

    let initiator = std::env::var("MPESA_INITIATOR").unwrap_or_else(|_| "testapi".to_string());
    let password = std::env::var("MPESA_INITIATOR_PASSWORD")?;
    let short_code: u32 = std::env::var("MPESA_SHORT_CODE")
        .unwrap_or_else(|_| "600984".to_string())
        .parse()?;
    let result_url = std::env::var("MPESA_RESULT_URL")
        .unwrap_or_else(|_| "https://example.com/mpesa/result".to_string());

    let request = AccountBalanceRequest::new(
        initiator,
        password,
        short_code,
        "Balance check",
        result_url.clone(),
        result_url,
    );

    let ack = client.account_balance(request).await?;
    println!(
        "{} ({}): conversation {}",
        ack.response_description, ack.response_code, ack.conversation_id
    );

    Ok(())
}
