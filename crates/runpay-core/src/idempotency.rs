//! Idempotency keys for webhook deliveries and order creation

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 identifying one logical payment event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Hex digest
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IdempotencyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the key for an order, optionally scoped to a gateway transaction
///
/// Hashes `order_reference`, or `order_reference-transaction_id` when a
/// non-empty transaction id is given. Pure: same input, same key.
#[must_use]
pub fn generate_idempotency_key(order_reference: &str, transaction_id: Option<&str>) -> IdempotencyKey {
    let mut hasher = Sha256::new();
    hasher.update(order_reference.as_bytes());
    if let Some(tx) = transaction_id.filter(|t| !t.is_empty()) {
        hasher.update(b"-");
        hasher.update(tx.as_bytes());
    }
    IdempotencyKey(hex::encode(hasher.finalize()))
}
