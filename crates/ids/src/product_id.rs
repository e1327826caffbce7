use crate::{IdError, IdResult};
use rand::Rng;
use std::{fmt, str::FromStr};

/// Lowest generated identifier (inclusive).
const MIN_GENERATED: u32 = 100_000;

/// Highest generated identifier (inclusive).
const MAX_GENERATED: u32 = 999_999;

/// A product identifier.
///
/// Serialised as a plain JSON string (`"id": "482913"`).
///
/// # Construction
/// - [`ProductId::generate`] draws a fresh six-digit identifier for a new record.
/// - [`ProductId::parse`] wraps an identifier received from outside (path parameter, stored
///   document). Any non-blank token is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Generates a new six-digit identifier.
    ///
    /// The value is chosen independently of existing identifiers, so callers that need
    /// uniqueness must check it against their collection.
    pub fn generate() -> Self {
        let value = rand::thread_rng().gen_range(MIN_GENERATED..=MAX_GENERATED);
        Self(value.to_string())
    }

    /// Wraps an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is empty or whitespace-only.
    pub fn parse(input: &str) -> IdResult<Self> {
        if input.trim().is_empty() {
            return Err(IdError::InvalidInput(
                "product id cannot be empty".into(),
            ));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns true if `input` has the generated form: exactly six ASCII digits, no leading zero.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 6
            && input.bytes().all(|b| b.is_ascii_digit())
            && !input.starts_with('0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductId::parse(s)
    }
}

impl PartialEq<str> for ProductId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'de> serde::Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ProductId::parse(&s).map_err(serde::de::Error::custom)
    }
}
