//! Gateway webhook payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::amount::Amount;
use crate::config::GatewayConfig;
use crate::error::{PaymentError, ValidationError};
use crate::idempotency::{generate_idempotency_key, IdempotencyKey};
use crate::payment::{PaymentRecord, PaymentStatus};
use crate::reference::OrderReference;
use crate::sanitize::sanitize_log_data;
use crate::signature::{verify_jenga_signature, SignatureData};

/// Notification body posted by the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub order_reference: Option<String>,
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub hash: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub mobile_number: Option<String>,
    pub message: Option<String>,
}

/// Callback that passed field validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCallback {
    pub order_reference: OrderReference,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub hash: String,
    pub idempotency_key: IdempotencyKey,
}

impl CallbackPayload {
    /// Check required fields and map the gateway status
    ///
    /// # Errors
    /// - [`PaymentError::Validation`] listing missing `orderReference`/`status`
    /// - [`PaymentError::UnknownStatus`] for unrecognised status strings
    pub fn validate(&self) -> Result<ValidCallback, PaymentError> {
        let mut v = ValidationError::new();
        v.require("orderReference", self.order_reference.as_deref());
        v.require("status", self.status.as_deref());
        v.into_result()?;

        let raw_reference = self.order_reference.as_deref().unwrap_or_default();
        let order_reference = OrderReference::parse(raw_reference).map_err(|e| ValidationError {
            missing: Vec::new(),
            invalid: vec![format!("orderReference: {e}")],
        })?;
        let status = PaymentStatus::from_gateway(self.status.as_deref().unwrap_or_default())?;

        let transaction_id = self
            .transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        let idempotency_key =
            generate_idempotency_key(order_reference.as_str(), transaction_id.as_deref());

        Ok(ValidCallback {
            order_reference,
            status,
            transaction_id,
            hash: self.hash.clone().unwrap_or_default(),
            idempotency_key,
        })
    }

    /// Payload as a sanitized JSON object for structured logs
    #[must_use]
    pub fn log_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => sanitize_log_data(&map),
            _ => Map::new(),
        }
    }
}

impl ValidCallback {
    /// Verify the gateway hash against the stored order
    ///
    /// Uses the amount and currency that were signed at creation, not the
    /// values echoed in the notification.
    #[must_use]
    pub fn verify(&self, record: &PaymentRecord, gateway: &GatewayConfig) -> bool {
        let data = SignatureData::new(
            &gateway.merchant_code,
            self.order_reference.as_str(),
            Some(&record.currency),
            &record.amount,
            &gateway.callback_url(),
        );
        verify_jenga_signature(&data, &self.hash)
    }
}
