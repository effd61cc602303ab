//! Order creation: request validation and signed record construction

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::config::GatewayConfig;
use crate::error::{ConfigError, PaymentError, ValidationError};
use crate::payment::{Customer, PaymentRecord};
use crate::reference::{generate_order_reference, OrderReference};
use crate::signature::{sign_signature_data, SignatureData};
use crate::signer::PaymentSigner;

/// Order creation payload from the shop/registration page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    /// Client retry of an earlier creation
    pub order_reference: Option<String>,
}

/// Order that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub order_reference: OrderReference,
    pub amount: Amount,
    pub currency: String,
    pub customer: Customer,
    pub description: Option<String>,
    /// Reference came from the client rather than being generated
    pub is_retry: bool,
}

impl OrderRequest {
    /// Check required fields and normalize values
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing every missing or invalid field
    pub fn validate(self, default_currency: &str) -> Result<ValidatedOrder, ValidationError> {
        let mut v = ValidationError::new();
        if self.amount.is_none() {
            v.missing.push("amount".to_string());
        }
        v.require("customerName", self.customer_name.as_deref());
        v.require("customerEmail", self.customer_email.as_deref());
        v.require("customerPhone", self.customer_phone.as_deref());

        if let Some(amount) = &self.amount {
            if !amount.is_positive() {
                v.invalid(format!("amount must be a positive number, got {amount}"));
            }
        }
        if let Some(email) = self.customer_email.as_deref().map(str::trim) {
            if !email.is_empty() && !email.contains('@') {
                v.invalid("customerEmail is not an email address");
            }
        }
        if let Some(phone) = self.customer_phone.as_deref().map(str::trim) {
            if !phone.is_empty() && !is_phone(phone) {
                v.invalid("customerPhone must contain only digits, spaces and a leading +");
            }
        }

        let supplied_reference = match self.order_reference.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match OrderReference::parse(raw) {
                Ok(r) => Some(r),
                Err(e) => {
                    v.invalid(format!("orderReference: {e}"));
                    None
                }
            },
            _ => None,
        };

        v.into_result()?;

        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_currency.to_string());

        let is_retry = supplied_reference.is_some();
        let order_reference = supplied_reference.unwrap_or_else(|| generate_order_reference(None));

        // presence checked above
        let trimmed = |s: Option<String>| s.unwrap_or_default().trim().to_string();
        Ok(ValidatedOrder {
            order_reference,
            amount: self.amount.unwrap_or_else(|| Amount::from_units(0)),
            currency,
            customer: Customer {
                name: trimmed(self.customer_name),
                email: trimmed(self.customer_email),
                phone: trimmed(self.customer_phone),
            },
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_retry,
        })
    }
}

fn is_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
}

impl ValidatedOrder {
    /// Signature data for this order under `gateway`
    #[must_use]
    pub fn signature_data(&self, gateway: &GatewayConfig) -> SignatureData {
        SignatureData::new(
            &gateway.merchant_code,
            self.order_reference.as_str(),
            Some(&self.currency),
            &self.amount,
            &gateway.callback_url(),
        )
    }

    /// Sign and build the stored record
    ///
    /// # Errors
    /// - [`PaymentError::Config`] when signed orders are required but no
    ///   signer is available
    /// - [`PaymentError::Signing`] when RSA signing fails
    pub fn into_record(
        self,
        gateway: &GatewayConfig,
        signer: Option<&PaymentSigner>,
    ) -> Result<PaymentRecord, PaymentError> {
        if signer.is_none() && gateway.require_signed_orders {
            return Err(ConfigError::Missing("gateway.private_key").into());
        }
        let signature = sign_signature_data(&self.signature_data(gateway), signer)?;
        Ok(PaymentRecord::new(
            self.order_reference,
            self.amount,
            self.currency,
            self.customer,
            self.description,
            signature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OrderRequest {
        OrderRequest {
            amount: Some(Amount::from_units(1500)),
            currency: None,
            customer_name: Some(" Wanjiru Kamau ".to_string()),
            customer_email: Some("wanjiru@example.org".to_string()),
            customer_phone: Some("+254 712 345678".to_string()),
            description: Some("Half marathon entry".to_string()),
            order_reference: None,
        }
    }

    fn gateway() -> GatewayConfig {
        GatewayConfig::default()
            .with_merchant_code("MERCH01")
            .with_site_base_url("https://run.example.org")
    }

    #[test]
    fn valid_request_generates_reference() {
        let order = request().validate("KES").unwrap();
        assert!(order.order_reference.as_str().starts_with("ORD"));
        assert_eq!(order.currency, "KES");
        assert_eq!(order.customer.name, "Wanjiru Kamau");
        assert!(!order.is_retry);
    }

    #[test]
    fn missing_fields_are_all_listed() {
        let err = OrderRequest::default().validate("KES").unwrap_err();
        assert_eq!(
            err.missing,
            vec!["amount", "customerName", "customerEmail", "customerPhone"]
        );
    }

    #[test]
    fn invalid_values_reported() {
        let mut req = request();
        req.amount = Some(Amount::from_units(0));
        req.customer_email = Some("not-an-email".to_string());
        req.customer_phone = Some("call me".to_string());
        let err = req.validate("KES").unwrap_err();
        assert!(err.missing.is_empty());
        assert_eq!(err.invalid.len(), 3);
    }

    #[test]
    fn client_reference_is_sanitized_and_marked_retry() {
        let mut req = request();
        req.order_reference = Some("ord-42x".to_string());
        let order = req.validate("KES").unwrap();
        assert_eq!(order.order_reference.as_str(), "ORD42X");
        assert!(order.is_retry);
    }

    #[test]
    fn currency_normalized() {
        let mut req = request();
        req.currency = Some(" usd ".to_string());
        assert_eq!(req.validate("KES").unwrap().currency, "USD");
    }

    #[test]
    fn unsigned_record_when_no_key() {
        let record = request().validate("KES").unwrap().into_record(&gateway(), None).unwrap();
        assert!(record.is_unsigned());
    }

    #[test]
    fn unsigned_rejected_when_required() {
        let err = request()
            .validate("KES")
            .unwrap()
            .into_record(&gateway().with_require_signed_orders(true), None)
            .unwrap_err();
        assert!(matches!(err, PaymentError::Config(_)));
    }

    #[test]
    fn signature_data_uses_callback_url() {
        let mut req = request();
        req.order_reference = Some("ORD1".to_string());
        let data = req.validate("KES").unwrap().signature_data(&gateway());
        assert_eq!(
            data.as_str(),
            "MERCH01ORD1KES1500https://run.example.org/api/payments/callback"
        );
    }
}
