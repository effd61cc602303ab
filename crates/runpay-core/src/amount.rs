//! Order amounts as they appear in signature data
//!
//! The gateway hashes the amount as text, so [`Amount`] keeps the exact
//! textual form. JSON numbers use `f64` `Display`: integral values have no
//! fractional part (`1000`), everything else uses the shortest round-trip
//! decimal (`1000.5`). This matches the checkout page for ordinary currency
//! amounts only. `Display` never switches to exponent notation, so values at
//! or above `1e21` or below `1e-6` render differently from a JavaScript
//! template string (`1e+21`, `1e-7`). Clients sending such values should
//! send the amount as a string.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Textual order amount
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    /// Amount from a whole number of currency units
    #[inline]
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(units.to_string())
    }

    /// Amount from a floating point value
    ///
    /// # Errors
    /// Returns error for NaN or infinite values
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        // f64 Display never prints a trailing ".0" for integral values
        Ok(Self(format!("{value}")))
    }

    /// The text used in signature data
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the text parses as a number
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// True when the amount is a finite number greater than zero
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.value().is_some_and(|v| v > 0.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl serde::Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("an amount as a number or numeric string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Amount::from_units(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Amount(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Amount::from_f64(value).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Errors building an [`Amount`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Blank amount text
    #[error("amount is empty")]
    Empty,

    /// NaN or infinity
    #[error("amount is not a finite number")]
    NotFinite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_has_no_fraction() {
        assert_eq!(Amount::from_f64(1000.0).unwrap().as_str(), "1000");
        assert_eq!(Amount::from_f64(1000.5).unwrap().as_str(), "1000.5");
    }

    #[test]
    fn extreme_floats_render_without_exponent() {
        assert_eq!(Amount::from_f64(1e21).unwrap().as_str(), "1000000000000000000000");
        assert_eq!(Amount::from_f64(1e-7).unwrap().as_str(), "0.0000001");
    }

    #[test]
    fn non_finite_rejected() {
        assert_eq!(Amount::from_f64(f64::NAN), Err(AmountError::NotFinite));
        assert_eq!(Amount::from_f64(f64::INFINITY), Err(AmountError::NotFinite));
    }

    #[test]
    fn json_number_and_string_forms() {
        let a: Amount = serde_json::from_str("1500").unwrap();
        assert_eq!(a.as_str(), "1500");
        let b: Amount = serde_json::from_str("1500.0").unwrap();
        assert_eq!(b.as_str(), "1500");
        let c: Amount = serde_json::from_str("\"1500.00\"").unwrap();
        assert_eq!(c.as_str(), "1500.00");
    }

    #[test]
    fn string_form_is_preserved_for_hashing() {
        let a: Amount = " 250.50 ".parse().unwrap();
        assert_eq!(a.to_string(), "250.50");
        assert!("   ".parse::<Amount>().is_err());
    }

    #[test]
    fn positivity() {
        assert!(Amount::from_units(1).is_positive());
        assert!(!Amount::from_units(0).is_positive());
        assert!(!"-5".parse::<Amount>().unwrap().is_positive());
        assert!(!"abc".parse::<Amount>().unwrap().is_positive());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::from_units(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
