use crate::coin::Amount;
use crate::{ActionError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const RATIO_PRECISION: u32 = 18;
const ONE: u128 = 1_000_000_000_000_000_000; // 10^18

/// Fixed-point fraction with 18 decimal places, written like `0.050000000000000000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FeeRatio(u128);

impl FeeRatio {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE);

    pub fn from_atomics(atomics: u128) -> Self {
        Self(atomics)
    }

    /// Ratio of `numerator / denominator`, truncated to 18 decimals
    pub fn from_fraction(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Self(numerator as u128 * ONE / denominator as u128))
    }

    pub fn atomics(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `floor(amount * self)` without intermediate overflow
    pub fn mul_floor(&self, amount: Amount) -> Amount {
        let whole = amount / ONE;
        let frac = amount % ONE;
        whole * self.0 + frac * self.0 / ONE
    }
}

impl FromStr for FeeRatio {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || ActionError::InvalidParams(format!("invalid ratio '{}'", s));

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty()
            || !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.len() > RATIO_PRECISION as usize
        {
            return Err(invalid());
        }

        let whole: u128 = int_part.parse().map_err(|_| invalid())?;
        let mut frac: u128 = 0;
        if !frac_part.is_empty() {
            let padding = RATIO_PRECISION as usize - frac_part.len();
            frac = frac_part.parse::<u128>().map_err(|_| invalid())? * 10u128.pow(padding as u32);
        }

        whole
            .checked_mul(ONE)
            .and_then(|w| w.checked_add(frac))
            .map(FeeRatio)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for FeeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / ONE, self.0 % ONE)
    }
}

impl Serialize for FeeRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeeRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
