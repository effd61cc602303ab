//! Error types for runpay-core
//!
//! Covers:
//! - Structured validation failures (missing request fields)
//! - Private key loading and signing failures
//! - Payment lifecycle violations
//! - Configuration problems

use crate::payment::PaymentStatus;

/// Main payment error type
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Request payload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Private key could not be loaded
    #[error("private key error: {0}")]
    Key(#[from] KeyError),

    /// RSA signing failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Status change not allowed by the payment lifecycle
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: PaymentStatus,
        /// Requested status
        to: PaymentStatus,
    },

    /// Gateway reported a status string we do not recognise
    #[error("unknown gateway status: {0}")]
    UnknownStatus(String),

    /// Order not found
    #[error("order not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PaymentError {
    /// Check if the error was caused by the caller's input
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnknownStatus(_)
                | Self::NotFound(_)
                | Self::IllegalTransition { .. }
        )
    }
}

/// Structured validation failure
///
/// `missing` lists the wire (camelCase) names of absent required fields.
/// `invalid` carries free-form messages for fields that were present but
/// unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: missing [{}]{}", .missing.join(", "), invalid_suffix(.invalid))]
pub struct ValidationError {
    /// Names of required fields that were absent or blank
    pub missing: Vec<String>,
    /// Problems with fields that were present
    pub invalid: Vec<String>,
}

fn invalid_suffix(invalid: &[String]) -> String {
    if invalid.is_empty() {
        String::new()
    } else {
        format!(", invalid [{}]", invalid.join(", "))
    }
}

impl ValidationError {
    /// Create empty validation result
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing field when `value` is absent or blank
    pub fn require(&mut self, name: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.missing.push(name.to_string());
        }
    }

    /// Record an invalid field
    pub fn invalid(&mut self, message: impl Into<String>) {
        self.invalid.push(message.into());
    }

    /// True when nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    /// Convert into a `Result`, failing if anything was recorded
    ///
    /// # Errors
    /// Returns `self` when at least one field is missing or invalid
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Private key loading errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Key file could not be read
    #[error("cannot read key file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Base64 wrapper could not be decoded
    #[error("invalid base64 key: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded key bytes were not UTF-8 PEM
    #[error("key is not valid UTF-8 PEM")]
    NotUtf8,

    /// PEM did not contain a PKCS#8 or PKCS#1 RSA private key
    #[error("unsupported or malformed RSA private key: {0}")]
    Parse(String),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required setting is empty
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// Setting present but unusable
    #[error("invalid setting {name}: {reason}")]
    Invalid {
        /// Setting name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Config file could not be read or parsed
    #[error("config file error: {0}")]
    File(String),

    /// Validation found blocking problems
    #[error("configuration rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
}
