//! Provider-safe order references
//!
//! References are `PREFIX + unix millis + 4 random alphanumerics`,
//! upper-cased and stripped to `[A-Z0-9]` so they pass the gateway's
//! reference field validation.

use std::fmt::{self, Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "ORD";

/// Random characters appended after the timestamp
pub const SUFFIX_LEN: usize = 4;

/// Uppercase alphanumeric order reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderReference(String);

impl OrderReference {
    /// Sanitize arbitrary text into a reference
    ///
    /// # Errors
    /// Returns [`ReferenceError::Empty`] when nothing alphanumeric remains
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let cleaned = sanitize(input);
        if cleaned.is_empty() {
            return Err(ReferenceError::Empty);
        }
        Ok(Self(cleaned))
    }

    /// Reference text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderReference {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderReference> for String {
    fn from(value: OrderReference) -> Self {
        value.0
    }
}

impl AsRef<str> for OrderReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// Input had no characters in `[A-Za-z0-9]`
    #[error("order reference is empty after sanitization")]
    Empty,
}

fn sanitize(input: &str) -> String {
    input
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Generate a fresh order reference
///
/// `prefix` defaults to [`DEFAULT_PREFIX`]; it goes through the same
/// sanitization as the rest of the reference.
#[must_use]
pub fn generate_order_reference(prefix: Option<&str>) -> OrderReference {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX);
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    // timestamp and suffix always contribute characters, so never empty
    OrderReference(sanitize(&format!("{prefix}{millis}{suffix}")))
}
