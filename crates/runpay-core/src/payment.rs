//! Payment records and their status lifecycle
//!
//! ```text
//! Created ──► Processing ──► Paid
//!    │             └───────► Failed
//!    └──────────────────────► Paid | Failed
//! ```
//!
//! `Paid` and `Failed` are terminal. Re-applying the current status is
//! accepted as a no-op so that gateway retries are harmless.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::PaymentError;
use crate::idempotency::IdempotencyKey;
use crate::reference::OrderReference;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order stored, checkout not started
    Created,
    /// Gateway accepted the request, outcome pending
    Processing,
    /// Money received
    Paid,
    /// Declined, cancelled or reversed
    Failed,
}

impl PaymentStatus {
    /// No further transitions allowed
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }

    /// Check whether moving to `next` is allowed
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Created, Self::Created | Self::Processing | Self::Paid | Self::Failed)
            | (Self::Processing, Self::Processing | Self::Paid | Self::Failed)
            | (Self::Paid, Self::Paid)
            | (Self::Failed, Self::Failed) => true,
            _ => false,
        }
    }

    /// Map a gateway status string
    ///
    /// # Errors
    /// Returns [`PaymentError::UnknownStatus`] for unrecognised values
    pub fn from_gateway(status: &str) -> Result<Self, PaymentError> {
        match status.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "SUCCESSFUL" | "COMPLETED" | "PAID" | "00" => Ok(Self::Paid),
            "FAILED" | "FAILURE" | "CANCELLED" | "CANCELED" | "DECLINED" | "REVERSED" => {
                Ok(Self::Failed)
            }
            "PENDING" | "PROCESSING" => Ok(Self::Processing),
            _ => Err(PaymentError::UnknownStatus(status.to_string())),
        }
    }

    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runner contact details attached to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
}

/// Result of applying a gateway notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Record changed (or same status re-confirmed under a new key)
    Applied {
        /// Status before the update
        previous: PaymentStatus,
        /// Status after the update
        current: PaymentStatus,
    },
    /// Key already applied; nothing changed
    Duplicate,
}

/// Stored order/payment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Provider-safe reference
    pub order_reference: OrderReference,
    /// Amount as signed
    pub amount: Amount,
    /// Currency as signed
    pub currency: String,
    /// Contact details
    pub customer: Customer,
    /// What was bought (ticket, merchandise)
    pub description: Option<String>,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// Gateway transaction id, set by the first notification carrying one
    pub transaction_id: Option<String>,
    /// Base64 RSA signature; empty when unsigned
    pub signature: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last change
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    processed_keys: HashSet<(IdempotencyKey, PaymentStatus)>,
}

impl PaymentRecord {
    /// New record in `Created` status
    #[must_use]
    pub fn new(
        order_reference: OrderReference,
        amount: Amount,
        currency: String,
        customer: Customer,
        description: Option<String>,
        signature: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_reference,
            amount,
            currency,
            customer,
            description,
            status: PaymentStatus::Created,
            transaction_id: None,
            signature,
            created_at: now,
            updated_at: now,
            processed_keys: HashSet::new(),
        }
    }

    /// True when the record carries no signature
    #[inline]
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.signature.is_empty()
    }

    /// Whether `key` has already been applied with `status`
    #[inline]
    #[must_use]
    pub fn has_processed(&self, key: &IdempotencyKey, status: PaymentStatus) -> bool {
        self.processed_keys.contains(&(key.clone(), status))
    }

    /// Apply a gateway notification exactly once per key and status
    ///
    /// The key does not encode the status, so a `PENDING` then `SUCCESS`
    /// pair for the same transaction shares one key. Only a repeat of the
    /// same key with the same status is a duplicate.
    ///
    /// # Errors
    /// Returns [`PaymentError::IllegalTransition`] when the lifecycle forbids
    /// the move; the record is left untouched and the key is not recorded
    pub fn apply_gateway_update(
        &mut self,
        key: IdempotencyKey,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<UpdateOutcome, PaymentError> {
        if self.has_processed(&key, status) {
            return Ok(UpdateOutcome::Duplicate);
        }

        let previous = self.status;
        if !previous.can_transition_to(status) {
            return Err(PaymentError::IllegalTransition {
                from: previous,
                to: status,
            });
        }

        self.status = status;
        if self.transaction_id.is_none() {
            self.transaction_id = transaction_id
                .filter(|t| !t.is_empty())
                .map(ToString::to_string);
        }
        self.updated_at = Utc::now();
        self.processed_keys.insert((key, status));

        Ok(UpdateOutcome::Applied {
            previous,
            current: status,
        })
    }
}
