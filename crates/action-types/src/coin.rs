use crate::{ActionError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token amount in base units of a single denomination
pub type Amount = u128;

/// A single-denomination amount, written as `<amount><denom>` (e.g. `100000ulume`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(amount: Amount, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(0, denom)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn checked_add(&self, other: &Coin) -> Option<Coin> {
        if self.denom != other.denom {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Coin::new(amount, self.denom.clone()))
    }

    pub fn checked_mul(&self, factor: u64) -> Option<Coin> {
        self.amount
            .checked_mul(factor as Amount)
            .map(|amount| Coin::new(amount, self.denom.clone()))
    }
}

/// Denominations start with a letter and are 3-128 characters of `[a-zA-Z0-9/:._-]`
pub fn validate_denom(denom: &str) -> Result<()> {
    let mut chars = denom.chars();
    let first_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok =
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));

    if !first_ok || !rest_ok || denom.len() < 3 || denom.len() > 128 {
        return Err(ActionError::InvalidPrice(format!("invalid denom '{}'", denom)));
    }
    Ok(())
}

impl FromStr for Coin {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ActionError::InvalidPrice(format!("missing denom in '{}'", s)))?;
        let (digits, denom) = s.split_at(split);

        if digits.is_empty() {
            return Err(ActionError::InvalidPrice(format!("missing amount in '{}'", s)));
        }

        let amount = digits
            .parse::<Amount>()
            .map_err(|e| ActionError::InvalidPrice(format!("invalid amount in '{}': {}", s, e)))?;
        validate_denom(denom)?;

        Ok(Coin::new(amount, denom))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl Serialize for Coin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
