//! Testing utilities for the runpay workspace
//!
//! Shared RSA key material, gateway configs and payload fixtures.

#![allow(missing_docs)]

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use runpay_core::{
    Amount, CallbackPayload, GatewayConfig, OrderRequest, PaymentRecord, PaymentSigner,
    PrivateKeySource, RunpayConfig, SignatureData,
};

pub const TEST_MERCHANT_CODE: &str = "MERCH01";
pub const TEST_SITE_URL: &str = "https://run.example.org";

// Key generation is slow; do it once per test binary
static TEST_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate test RSA key"));

static TEST_KEY_PKCS8_PEM: Lazy<String> = Lazy::new(|| {
    TEST_KEY
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode pkcs8 pem")
        .as_str()
        .to_owned()
});

static TEST_KEY_PKCS1_PEM: Lazy<String> = Lazy::new(|| {
    TEST_KEY
        .to_pkcs1_pem(LineEnding::LF)
        .expect("encode pkcs1 pem")
        .as_str()
        .to_owned()
});

pub fn test_private_key_pem() -> &'static str {
    &TEST_KEY_PKCS8_PEM
}

pub fn test_private_key_pkcs1_pem() -> &'static str {
    &TEST_KEY_PKCS1_PEM
}

pub fn test_signer() -> PaymentSigner {
    PaymentSigner::new(TEST_KEY.clone())
}

pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_merchant_code(TEST_MERCHANT_CODE)
        .with_site_base_url(TEST_SITE_URL)
}

pub fn test_signed_gateway_config() -> GatewayConfig {
    test_gateway_config().with_private_key(PrivateKeySource::Pem(test_private_key_pem().to_string()))
}

pub fn test_config() -> RunpayConfig {
    RunpayConfig::new().with_gateway(test_gateway_config())
}

pub fn sample_order_request() -> OrderRequest {
    OrderRequest {
        amount: Some(Amount::from_units(1500)),
        currency: None,
        customer_name: Some("Akinyi Odhiambo".to_string()),
        customer_email: Some("akinyi@example.org".to_string()),
        customer_phone: Some("254712345678".to_string()),
        description: Some("10K fun run entry".to_string()),
        order_reference: None,
    }
}

/// Hash the gateway would send for `record`
pub fn gateway_hash_for(record: &PaymentRecord, gateway: &GatewayConfig) -> String {
    SignatureData::new(
        &gateway.merchant_code,
        record.order_reference.as_str(),
        Some(&record.currency),
        &record.amount,
        &gateway.callback_url(),
    )
    .sha256_hex()
}

/// Hash for raw fields, for tests that never hold a record
pub fn gateway_hash(reference: &str, currency: &str, amount: u64, gateway: &GatewayConfig) -> String {
    SignatureData::new(
        &gateway.merchant_code,
        reference,
        Some(currency),
        &Amount::from_units(amount),
        &gateway.callback_url(),
    )
    .sha256_hex()
}

pub fn sample_callback(reference: &str, status: &str, transaction_id: &str, hash: &str) -> CallbackPayload {
    CallbackPayload {
        order_reference: Some(reference.to_string()),
        status: Some(status.to_string()),
        transaction_id: Some(transaction_id.to_string()),
        hash: Some(hash.to_string()),
        mobile_number: Some("254712345678".to_string()),
        ..Default::default()
    }
}
