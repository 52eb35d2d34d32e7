//! Exact fixed-point amounts.
//!
//! An [`Amount`] is `mantissa / 10^scale`. Balances are built from the raw
//! integer returned by the chain and the token's decimals; thresholds are
//! parsed from configuration text. Comparison cross-multiplies in 512 bits so
//! no precision is lost at the threshold boundary.

use alloy_primitives::{U256, U512};
use serde::{de, Deserialize, Deserializer};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// Largest supported scale. `10^77` is the largest power of ten in 256 bits.
pub const MAX_SCALE: u8 = 77;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid decimal amount {0:?}")]
    Invalid(String),

    #[error("scale {0} exceeds the maximum of {MAX_SCALE}")]
    ScaleOutOfRange(usize),
}

/// A non-negative decimal amount with exact arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct Amount {
    mantissa: U256,
    scale: u8,
}

impl Amount {
    pub const ZERO: Self = Self {
        mantissa: U256::ZERO,
        scale: 0,
    };

    /// Scale a raw integer balance by `10^decimals`.
    pub fn from_raw(raw: U256, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_SCALE {
            return Err(AmountError::ScaleOutOfRange(decimals.into()));
        }
        Ok(Self {
            mantissa: raw,
            scale: decimals,
        })
    }

    pub const fn mantissa(&self) -> U256 {
        self.mantissa
    }

    pub const fn scale(&self) -> u8 {
        self.scale
    }

    fn widen(&self, extra_scale: u8) -> U512 {
        U512::from(self.mantissa) * pow10(extra_scale)
    }
}

fn pow10(exp: u8) -> U512 {
    U512::from(10u64).pow(U512::from(exp))
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.widen(other.scale).cmp(&other.widen(self.scale))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::Invalid(s.to_string()));
        }

        if frac_part.len() > usize::from(MAX_SCALE) {
            return Err(AmountError::ScaleOutOfRange(frac_part.len()));
        }

        let digits = format!("{int_part}{frac_part}");
        let mantissa = U256::from_str_radix(&digits, 10)
            .map_err(|_| AmountError::Invalid(s.to_string()))?;

        Ok(Self {
            mantissa,
            scale: frac_part.len() as u8,
        })
    }
}

/// Renders the exact value without trailing fractional zeros.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = usize::from(self.scale);
        let digits = format!("{:0>width$}", self.mantissa.to_string(), width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        let frac_part = frac_part.trim_end_matches('0');

        if frac_part.is_empty() {
            f.write_str(int_part)
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

/// Accepts decimal strings (exact) as well as TOML/JSON numbers.
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative decimal number or string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount {
                    mantissa: U256::from(v),
                    scale: 0,
                })
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(AmountError::Invalid(v.to_string())))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                if !v.is_finite() {
                    return Err(E::custom(AmountError::Invalid(v.to_string())));
                }
                // f64's Display never uses exponent notation and gives the
                // shortest text that round-trips, e.g. 0.1 -> "0.1".
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
