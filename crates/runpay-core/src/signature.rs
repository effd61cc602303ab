//! Signature data and webhook hash verification
//!
//! Both directions of the gateway integration hash the same string:
//! `merchantCode + orderReference + currency + amount + callbackUrl`, with
//! no separators. The field order is fixed by the gateway.
//!
//! - Outbound (order creation): RSA PKCS#1 v1.5 over SHA-256, base64, see
//!   [`crate::signer`].
//! - Inbound (webhook): plain SHA-256 hex, compared in constant time here.
//!
//! The two mechanisms are independent and use different primitives.

use std::fmt::{self, Display, Formatter};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::amount::Amount;
use crate::signer::PaymentSigner;
use crate::PaymentError;

/// Currency used when a request does not name one
pub const DEFAULT_CURRENCY: &str = "KES";

/// Length of a SHA-256 digest in lowercase hex
pub const SHA256_HEX_LEN: usize = 64;

/// Canonical signature input
///
/// Built once per sign/verify call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureData {
    merchant_code: String,
    data: String,
}

impl SignatureData {
    /// Concatenate the signed fields in gateway order
    ///
    /// `currency` falls back to [`DEFAULT_CURRENCY`] when absent or blank.
    #[must_use]
    pub fn new(
        merchant_code: &str,
        order_reference: &str,
        currency: Option<&str>,
        amount: &Amount,
        callback_url: &str,
    ) -> Self {
        let currency = currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CURRENCY);

        let mut data = String::with_capacity(
            merchant_code.len()
                + order_reference.len()
                + currency.len()
                + amount.as_str().len()
                + callback_url.len(),
        );
        data.push_str(merchant_code);
        data.push_str(order_reference);
        data.push_str(currency);
        data.push_str(amount.as_str());
        data.push_str(callback_url);

        Self {
            merchant_code: merchant_code.to_string(),
            data,
        }
    }

    /// The concatenated string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Raw bytes fed to the hash
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Merchant code the data was built with
    #[inline]
    #[must_use]
    pub fn merchant_code(&self) -> &str {
        &self.merchant_code
    }

    /// Lowercase hex SHA-256 of the signature data
    #[must_use]
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(self.as_bytes()))
    }
}

impl Display for SignatureData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

/// Sign signature data for an outbound payment request
///
/// With no signer configured the result is an empty string. Callers treat
/// an empty signature as unsigned; whether that is acceptable is decided by
/// [`crate::config::GatewayConfig::require_signed_orders`].
///
/// # Errors
/// Returns [`PaymentError::Signing`] if the RSA operation fails
pub fn sign_signature_data(
    data: &SignatureData,
    signer: Option<&PaymentSigner>,
) -> Result<String, PaymentError> {
    match signer {
        Some(signer) => signer.sign(data),
        None => {
            tracing::warn!("no private key configured, order signature left empty");
            Ok(String::new())
        }
    }
}

/// Verify a gateway webhook hash
///
/// Recomputes `SHA256_hex(signature data)` and compares it with
/// `received_hash` without short-circuiting on the first differing byte.
/// Surrounding whitespace is trimmed and hex case is ignored on the received
/// side. Returns `false` when the hash or merchant code is empty, or when
/// length or content differ. Never panics.
#[must_use]
pub fn verify_jenga_signature(data: &SignatureData, received_hash: &str) -> bool {
    let received = received_hash.trim();
    if received.is_empty() || data.merchant_code().trim().is_empty() {
        return false;
    }

    let expected = data.sha256_hex();
    let received = received.to_ascii_lowercase();
    if expected.len() != received.len() {
        return false;
    }

    expected.as_bytes().ct_eq(received.as_bytes()).into()
}
