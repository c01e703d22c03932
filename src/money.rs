//! Integer token amounts. No floating point anywhere near money.
//!
//! Amounts are counted in the smallest on-chain unit and serialize as
//! decimal strings so arbitrary-magnitude integers survive any JSON-like
//! transport (see §6 of the wire spec: "all token amounts serialize as
//! decimal strings").

use std::fmt;
use std::num::ParseIntError;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-negative token amount. Backed by `u128` so that payout
/// multiplication (stake * 9, the largest craps numerator) cannot overflow
/// at any stake a table's `max_bet` would plausibly allow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(u128);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub fn new(amount: u128) -> Self {
        Chips(amount)
    }

    pub fn as_u128(self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: Chips) -> Option<Chips> {
        self.0.checked_add(other.0).map(Chips)
    }

    pub fn checked_sub(self, other: Chips) -> Option<Chips> {
        self.0.checked_sub(other.0).map(Chips)
    }

    pub fn saturating_sub(self, other: Chips) -> Chips {
        Chips(self.0.saturating_sub(other.0))
    }

    /// `self * num / den`, truncating toward zero (house-favoring per §3).
    pub fn mul_div_floor(self, num: u128, den: u128) -> Chips {
        Chips((self.0 * num) / den)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Chips {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(Chips)
    }
}

impl From<u64> for Chips {
    fn from(value: u64) -> Self {
        Chips(value as u128)
    }
}

impl Add for Chips {
    type Output = Chips;
    fn add(self, rhs: Chips) -> Chips {
        Chips(self.0 + rhs.0)
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 += rhs.0;
    }
}

impl Sub for Chips {
    type Output = Chips;
    fn sub(self, rhs: Chips) -> Chips {
        Chips(self.0 - rhs.0)
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 -= rhs.0;
    }
}

impl Serialize for Chips {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Chips {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChipsVisitor;

        impl<'de> Visitor<'de> for ChipsVisitor {
            type Value = Chips;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or non-negative integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Chips, E>
            where
                E: de::Error,
            {
                v.parse::<u128>().map(Chips).map_err(de::Error::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Chips, E>
            where
                E: de::Error,
            {
                Ok(Chips(v as u128))
            }
        }

        deserializer.deserialize_any(ChipsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_string_round_trips() {
        let c = Chips::new(1_100_000);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"1100000\"");
        let back: Chips = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn payout_math_truncates_toward_zero() {
        // place-6 stake 60 wins 7:6 -> 60 + floor(60*7/6) = 60 + 70 = 130
        let stake = Chips::new(60);
        let winnings = stake.mul_div_floor(7, 6);
        assert_eq!(winnings, Chips::new(70));
        assert_eq!(stake + winnings, Chips::new(130));
    }
}
