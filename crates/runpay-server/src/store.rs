//! Order storage
//!
//! Handlers only see the [`OrderStore`] trait. The in-memory store keeps
//! records in a `DashMap`; idempotent status updates run under the
//! per-entry write lock so concurrent webhook retries apply at most once.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use runpay_core::{
    IdempotencyKey, OrderReference, PaymentError, PaymentRecord, PaymentStatus, UpdateOutcome,
};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record for the reference
    #[error("order not found: {0}")]
    NotFound(String),

    /// Update rejected by the payment lifecycle
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Backend failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of [`OrderStore::insert_if_absent`]
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// Record stored
    Created(PaymentRecord),
    /// A record with that reference already existed; returned unchanged
    Existing(PaymentRecord),
}

impl InsertOutcome {
    /// The stored record either way
    #[must_use]
    pub fn record(&self) -> &PaymentRecord {
        match self {
            Self::Created(r) | Self::Existing(r) => r,
        }
    }
}

/// Persistence seam for payment records
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store `record` unless its reference is taken
    async fn insert_if_absent(&self, record: PaymentRecord) -> Result<InsertOutcome, StoreError>;

    /// Look up a record
    async fn get(&self, reference: &OrderReference) -> Result<Option<PaymentRecord>, StoreError>;

    /// Apply a gateway notification; repeat keys are no-ops
    async fn apply_update(
        &self,
        reference: &OrderReference,
        key: IdempotencyKey,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<(UpdateOutcome, PaymentRecord), StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<OrderReference, PaymentRecord>,
}

impl InMemoryOrderStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when no orders are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_if_absent(&self, record: PaymentRecord) -> Result<InsertOutcome, StoreError> {
        match self.orders.entry(record.order_reference.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Existing(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(InsertOutcome::Created(record))
            }
        }
    }

    async fn get(&self, reference: &OrderReference) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.orders.get(reference).map(|r| r.value().clone()))
    }

    async fn apply_update(
        &self,
        reference: &OrderReference,
        key: IdempotencyKey,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<(UpdateOutcome, PaymentRecord), StoreError> {
        let mut entry = self
            .orders
            .get_mut(reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let outcome = entry.apply_gateway_update(key, status, transaction_id)?;
        Ok((outcome, entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runpay_core::{generate_idempotency_key, Amount, Customer};
    use std::sync::Arc;

    fn record(reference: &str) -> PaymentRecord {
        PaymentRecord::new(
            OrderReference::parse(reference).unwrap(),
            Amount::from_units(1000),
            "KES".to_string(),
            Customer {
                name: "Otieno".to_string(),
                email: "otieno@example.org".to_string(),
                phone: "254700000001".to_string(),
            },
            None,
            String::new(),
        )
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryOrderStore::new();
        let outcome = store.insert_if_absent(record("ORD1")).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Created(_)));

        let found = store.get(&OrderReference::parse("ORD1").unwrap()).await.unwrap();
        assert!(found.is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn second_insert_returns_existing() {
        let store = InMemoryOrderStore::new();
        let mut first = record("ORD1");
        first.signature = "first".to_string();
        store.insert_if_absent(first).await.unwrap();

        let mut second = record("ORD1");
        second.signature = "second".to_string();
        let outcome = store.insert_if_absent(second).await.unwrap();
        match outcome {
            InsertOutcome::Existing(r) => assert_eq!(r.signature, "first"),
            InsertOutcome::Created(_) => panic!("duplicate reference stored twice"),
        }
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let store = InMemoryOrderStore::new();
        let reference = OrderReference::parse("ORD404").unwrap();
        let err = store
            .apply_update(&reference, generate_idempotency_key("ORD404", None), PaymentStatus::Paid, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_replays_apply_once() {
        let store = Arc::new(InMemoryOrderStore::new());
        store.insert_if_absent(record("ORD1")).await.unwrap();
        let reference = OrderReference::parse("ORD1").unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let reference = reference.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply_update(
                        &reference,
                        generate_idempotency_key("ORD1", Some("TX1")),
                        PaymentStatus::Paid,
                        Some("TX1"),
                    )
                    .await
                    .unwrap()
                    .0
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), UpdateOutcome::Applied { .. }) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }
}
