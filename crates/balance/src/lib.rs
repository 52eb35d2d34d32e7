//! Balance monitoring for watched wallets.
//!
//! This crate provides the balance side of the watchdog: decoding raw RPC
//! results, querying native and ERC20 balances through a [`client::ChainClient`],
//! and evaluating every wallet/asset pair against its threshold.

pub mod amount;
pub mod codec;
pub mod evaluate;
pub mod monitor;

#[cfg(test)]
pub(crate) mod test_utils;

pub use amount::Amount;
pub use evaluate::{Breach, ThresholdEvaluator};

use std::{fmt, future::Future};
use thiserror::Error;

/// Decimals of every EVM native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// Length of a `0x`-prefixed, 40 hex digit address.
pub const ADDRESS_LEN: usize = 42;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} is not a 0x-prefixed 40 hex digit address")]
pub struct InvalidAddress(pub String);

/// Check that `s` is `0x` followed by exactly 40 hex digits.
pub fn validate_address(s: &str) -> Result<(), InvalidAddress> {
    let valid = s.len() == ADDRESS_LEN
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(InvalidAddress(s.to_string()))
    }
}

/// A watched wallet address, kept exactly as configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wallet(String);

impl Wallet {
    pub fn parse(address: impl Into<String>) -> Result<Self, InvalidAddress> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A balance source tracked for every wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// The chain's native coin
    Native {
        /// Alert when the balance drops below this many coins
        threshold: Amount,
    },
    /// An ERC20 token
    Token {
        /// Token contract address
        contract: String,
        /// Alert when the balance drops below this many tokens
        threshold: Amount,
        /// Display name; queried from `symbol()` when absent
        symbol: Option<String>,
    },
}

impl Asset {
    pub const fn threshold(&self) -> &Amount {
        match self {
            Self::Native { threshold } | Self::Token { threshold, .. } => threshold,
        }
    }

    /// Balance query for this asset held by `wallet`.
    pub fn query(&self, wallet: &Wallet) -> BalanceQuery {
        match self {
            Self::Native { .. } => BalanceQuery::NativeBalance {
                address: wallet.clone(),
            },
            Self::Token { contract, .. } => BalanceQuery::ERC20Balance {
                token: contract.clone(),
                holder: wallet.clone(),
            },
        }
    }
}

/// A balance observed at the latest block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// The wallet holding the balance
    pub holder: Wallet,
    /// Token contract, `None` for the native coin
    pub token: Option<String>,
    /// Balance in whole units
    pub amount: Amount,
}

/// Type of balance query to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceQuery {
    /// Query ERC20 token balance, scaled by the token's decimals
    ERC20Balance {
        /// Token contract address
        token: String,
        /// Holder address
        holder: Wallet,
    },
    /// Query native coin balance, scaled by 18 decimals
    NativeBalance {
        /// Account address
        address: Wallet,
    },
}

/// Trait for monitoring balances on a blockchain.
pub trait Monitor: Send + Sync {
    /// Query a single balance.
    fn query_balance(
        &self,
        query: BalanceQuery,
    ) -> impl Future<Output = eyre::Result<Balance>> + Send;

    /// Query the display symbol of a token contract.
    fn query_symbol(&self, token: &str) -> impl Future<Output = eyre::Result<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_parse() {
        let wallet = Wallet::parse("0xAbC0000000000000000000000000000000001111").unwrap();
        assert_eq!(wallet.hex_digits(), "AbC0000000000000000000000000000000001111");
        assert_eq!(wallet.to_string().len(), ADDRESS_LEN);

        for bad in [
            "AbC0000000000000000000000000000000001111",
            "0xAbC000000000000000000000000000000000111",
            "0xZbC0000000000000000000000000000000001111",
            "0xAbC00000000000000000000000000000000011110",
        ] {
            assert!(Wallet::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_asset_query() {
        let wallet = Wallet::parse(format!("0x{}", "1".repeat(40))).unwrap();
        let native = Asset::Native {
            threshold: "1".parse().unwrap(),
        };
        assert_eq!(
            native.query(&wallet),
            BalanceQuery::NativeBalance {
                address: wallet.clone()
            }
        );

        let token = Asset::Token {
            contract: format!("0x{}", "2".repeat(40)),
            threshold: "5".parse().unwrap(),
            symbol: None,
        };
        assert_eq!(token.threshold(), &"5".parse::<Amount>().unwrap());
        assert!(matches!(token.query(&wallet), BalanceQuery::ERC20Balance { .. }));
    }
}
