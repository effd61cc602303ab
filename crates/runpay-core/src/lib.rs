//! runpay Core
//!
//! Payment plumbing behind the charity-run site:
//! - Signature data construction for the payment gateway
//! - Outbound RSA-SHA256 signing of new orders
//! - Inbound webhook hash verification in constant time
//! - Idempotency keys, order references, payment lifecycle
//! - University name matching and log sanitization helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use runpay_core::{Amount, SignatureData, verify_jenga_signature};
//!
//! let data = SignatureData::new(
//!     &config.gateway.merchant_code,
//!     "ORD1700000000000AB12",
//!     None,
//!     &Amount::from_units(1500),
//!     &config.gateway.callback_url(),
//! );
//! assert!(verify_jenga_signature(&data, &received_hash));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod amount;
pub mod callback;
pub mod config;
pub mod error;
pub mod idempotency;
pub mod order;
pub mod payment;
pub mod reference;
pub mod sanitize;
pub mod signature;
pub mod signer;
pub mod university;

// Re-exports for convenience
pub use amount::{Amount, AmountError};
pub use callback::{CallbackPayload, ValidCallback};
pub use config::{ConfigReport, GatewayConfig, RunpayConfig, ServerConfig};
pub use error::{ConfigError, KeyError, PaymentError, ValidationError};
pub use idempotency::{generate_idempotency_key, IdempotencyKey};
pub use order::{OrderRequest, ValidatedOrder};
pub use payment::{Customer, PaymentRecord, PaymentStatus, UpdateOutcome};
pub use reference::{generate_order_reference, OrderReference, ReferenceError};
pub use sanitize::{sanitize_log_data, sanitize_log_value};
pub use signature::{sign_signature_data, verify_jenga_signature, SignatureData, DEFAULT_CURRENCY};
pub use signer::{verify_rsa_signature, PaymentSigner, PrivateKeySource};
pub use university::{match_university, normalize_string, KENYAN_UNIVERSITIES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn order_to_webhook_flow() {
        let gateway = GatewayConfig::default()
            .with_merchant_code("MERCH01")
            .with_site_base_url("https://run.example.org");

        let order = OrderRequest {
            amount: Some(Amount::from_units(2500)),
            customer_name: Some("Njeri".into()),
            customer_email: Some("njeri@example.org".into()),
            customer_phone: Some("254711111111".into()),
            ..Default::default()
        }
        .validate(&gateway.default_currency)
        .unwrap();

        let hash = order.signature_data(&gateway).sha256_hex();
        let mut record = order.into_record(&gateway, None).unwrap();

        let callback = CallbackPayload {
            order_reference: Some(record.order_reference.to_string()),
            status: Some("SUCCESS".into()),
            transaction_id: Some("TX77".into()),
            hash: Some(hash),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert!(callback.verify(&record, &gateway));
        let outcome = record
            .apply_gateway_update(callback.idempotency_key.clone(), callback.status, callback.transaction_id.as_deref())
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Applied { current: PaymentStatus::Paid, .. }));
        assert_eq!(
            record
                .apply_gateway_update(callback.idempotency_key, callback.status, None)
                .unwrap(),
            UpdateOutcome::Duplicate
        );
    }
}
