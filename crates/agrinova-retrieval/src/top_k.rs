//! Lenient `top_k` request parameter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Requested number of results.
///
/// Deserializes from any JSON value: a positive integer is taken as is, and
/// anything else (zero, negatives, fractions, strings, null) becomes zero,
/// meaning "no results" rather than a request error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopK(usize);

impl TopK {
    /// Results returned when the caller does not say.
    pub const DEFAULT: Self = Self(4);

    /// Wrap an explicit count.
    pub fn new(k: usize) -> Self {
        Self(k)
    }

    /// The requested count (zero means no results).
    pub fn get(self) -> usize {
        self.0
    }

    /// Interpret an arbitrary JSON value.
    pub fn from_value(value: &Value) -> Self {
        let k = value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        Self(k)
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for TopK {
    fn from(k: usize) -> Self {
        Self(k)
    }
}

impl<'de> Deserialize<'de> for TopK {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
