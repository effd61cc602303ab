//! Application state shared by all routes

use std::sync::Arc;

use runpay_core::{PaymentSigner, RunpayConfig};

use crate::store::{InMemoryOrderStore, OrderStore};

/// Shared handler state
pub struct AppState {
    /// Loaded configuration
    pub config: RunpayConfig,
    /// Merchant signer; `None` creates unsigned orders
    pub signer: Option<PaymentSigner>,
    /// Order persistence
    pub store: Arc<dyn OrderStore>,
}

impl AppState {
    /// Wrap the parts in an `Arc` for the router
    #[must_use]
    pub fn new(config: RunpayConfig, signer: Option<PaymentSigner>, store: Arc<dyn OrderStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            signer,
            store,
        })
    }

    /// State backed by the in-memory store, loading the signer from config
    ///
    /// # Errors
    /// Returns [`runpay_core::ConfigError`] when a configured key cannot be loaded
    pub fn in_memory(config: RunpayConfig) -> Result<Arc<Self>, runpay_core::ConfigError> {
        let signer = config.gateway.load_signer()?;
        Ok(Self::new(config, signer, Arc::new(InMemoryOrderStore::new())))
    }

    /// True when orders are signed
    #[must_use]
    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }
}
