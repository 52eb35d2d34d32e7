//! Threshold evaluation over every watched wallet and asset.

use crate::{Amount, Asset, Monitor, Wallet};
use eyre::Result;
use tracing::{debug, warn};

/// A wallet/asset pair whose balance is strictly below its threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breach {
    pub wallet: Wallet,
    /// Symbol shown in the alert
    pub symbol: String,
    /// Observed balance in whole units
    pub balance: Amount,
}

/// Compares fresh balances against configured thresholds.
///
/// Holds no state between passes: every call to [`Self::evaluate`] re-reads
/// balances, decimals and symbols from the chain.
pub struct ThresholdEvaluator<M> {
    monitor: M,
    native_symbol: String,
}

impl<M> ThresholdEvaluator<M>
where
    M: Monitor,
{
    pub fn new(monitor: M, native_symbol: impl Into<String>) -> Self {
        Self {
            monitor,
            native_symbol: native_symbol.into(),
        }
    }

    pub const fn monitor(&self) -> &M {
        &self.monitor
    }

    /// Evaluate every wallet against every asset.
    ///
    /// Breaches are ordered by wallet, then by asset, both in the given order.
    /// The first query failure aborts the pass.
    pub async fn evaluate(&self, wallets: &[Wallet], assets: &[Asset]) -> Result<Vec<Breach>> {
        let mut breaches = Vec::new();

        for wallet in wallets {
            for asset in assets {
                let balance = self.monitor.query_balance(asset.query(wallet)).await?;
                let threshold = asset.threshold();

                if balance.amount < *threshold {
                    let symbol = self.display_name(asset).await?;
                    warn!(
                        wallet = %wallet,
                        symbol = %symbol,
                        balance = %balance.amount,
                        threshold = %threshold,
                        "Balance below threshold"
                    );
                    breaches.push(Breach {
                        wallet: wallet.clone(),
                        symbol,
                        balance: balance.amount,
                    });
                } else {
                    debug!(
                        wallet = %wallet,
                        token = balance.token.as_deref().unwrap_or("native"),
                        balance = %balance.amount,
                        threshold = %threshold,
                        "Balance ok"
                    );
                }
            }
        }

        Ok(breaches)
    }

    async fn display_name(&self, asset: &Asset) -> Result<String> {
        match asset {
            Asset::Native { .. } => Ok(self.native_symbol.clone()),
            Asset::Token {
                symbol: Some(symbol),
                ..
            } => Ok(symbol.clone()),
            Asset::Token {
                contract,
                symbol: None,
                ..
            } => self.monitor.query_symbol(contract).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        monitor::BalanceMonitor,
        test_utils::{abi_string, word, MockChainClient, TOKEN, WALLET_A, WALLET_B},
    };

    const HALF_BNB: &str = "0x6f05b59d3b20000";
    const TWO_BNB: &str = "0x1bc16d674ec80000";

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn wallets(addresses: &[&str]) -> Vec<Wallet> {
        addresses.iter().map(|a| Wallet::parse(*a).unwrap()).collect()
    }

    fn native(threshold: &str) -> Asset {
        Asset::Native {
            threshold: amount(threshold),
        }
    }

    fn token(threshold: &str, symbol: Option<&str>) -> Asset {
        Asset::Token {
            contract: TOKEN.to_string(),
            threshold: amount(threshold),
            symbol: symbol.map(str::to_string),
        }
    }

    fn evaluator(client: MockChainClient) -> ThresholdEvaluator<BalanceMonitor<MockChainClient>> {
        ThresholdEvaluator::new(BalanceMonitor::new(client), "BNB")
    }

    #[tokio::test]
    async fn test_native_below_threshold() {
        let client = MockChainClient::new().with_native_balance(WALLET_A, HALF_BNB);

        let breaches = evaluator(client)
            .evaluate(&wallets(&[WALLET_A]), &[native("1.0")])
            .await
            .unwrap();

        assert_eq!(
            breaches,
            vec![Breach {
                wallet: Wallet::parse(WALLET_A).unwrap(),
                symbol: "BNB".to_string(),
                balance: amount("0.5"),
            }]
        );
    }

    #[tokio::test]
    async fn test_token_below_threshold_queries_symbol() {
        let client = MockChainClient::new()
            .with_token_balance(TOKEN, WALLET_A, &word(500_000))
            .with_token_decimals(TOKEN, &word(6))
            .with_token_symbol(TOKEN, &abi_string("USDT"));

        let breaches = evaluator(client)
            .evaluate(&wallets(&[WALLET_A]), &[token("1.0", None)])
            .await
            .unwrap();

        assert_eq!(breaches.len(), 1);
        assert_eq!(breaches[0].symbol, "USDT");
        assert_eq!(breaches[0].balance.to_string(), "0.5");
    }

    #[tokio::test]
    async fn test_configured_label_skips_symbol_call() {
        let client = MockChainClient::new()
            .with_token_balance(TOKEN, WALLET_A, &word(500_000))
            .with_token_decimals(TOKEN, &word(6));
        let evaluator = evaluator(client);

        let breaches = evaluator
            .evaluate(&wallets(&[WALLET_A]), &[token("1.0", Some("USD Tether"))])
            .await
            .unwrap();

        assert_eq!(breaches[0].symbol, "USD Tether");
        assert!(evaluator
            .monitor()
            .client()
            .requests()
            .iter()
            .all(|(_, call)| call["input"] != "0x95d89b41"));
    }

    #[tokio::test]
    async fn test_equal_balance_is_not_a_breach() {
        let client = MockChainClient::new()
            .with_native_balance(WALLET_A, HALF_BNB)
            .with_token_balance(TOKEN, WALLET_A, &word(1_000_000))
            .with_token_decimals(TOKEN, &word(6));

        let breaches = evaluator(client)
            .evaluate(&wallets(&[WALLET_A]), &[native("0.5"), token("1", Some("USDT"))])
            .await
            .unwrap();

        assert!(breaches.is_empty());
    }

    #[tokio::test]
    async fn test_one_unit_below_is_a_breach() {
        let client = MockChainClient::new()
            .with_token_balance(TOKEN, WALLET_A, &word(999_999))
            .with_token_decimals(TOKEN, &word(6));

        let breaches = evaluator(client)
            .evaluate(&wallets(&[WALLET_A]), &[token("1", Some("USDT"))])
            .await
            .unwrap();

        assert_eq!(breaches[0].balance.to_string(), "0.999999");
    }

    #[tokio::test]
    async fn test_breaches_follow_configuration_order() {
        let client = MockChainClient::new()
            .with_native_balance(WALLET_A, HALF_BNB)
            .with_native_balance(WALLET_B, TWO_BNB)
            .with_token_balance(TOKEN, WALLET_A, &word(0))
            .with_token_balance(TOKEN, WALLET_B, &word(5))
            .with_token_decimals(TOKEN, &word(0));

        let breaches = evaluator(client)
            .evaluate(
                &wallets(&[WALLET_B, WALLET_A]),
                &[token("10", Some("USDT")), native("1")],
            )
            .await
            .unwrap();

        let order: Vec<_> = breaches
            .iter()
            .map(|b| (b.wallet.as_str(), b.symbol.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(WALLET_B, "USDT"), (WALLET_A, "USDT"), (WALLET_A, "BNB")]
        );
    }

    #[tokio::test]
    async fn test_decimals_read_every_pass() {
        let client = MockChainClient::new()
            .with_token_balance(TOKEN, WALLET_A, &word(5))
            .with_token_decimals(TOKEN, &word(0));
        let evaluator = evaluator(client);
        let wallets = wallets(&[WALLET_A]);
        let assets = [token("1", Some("USDT"))];

        evaluator.evaluate(&wallets, &assets).await.unwrap();
        evaluator.evaluate(&wallets, &assets).await.unwrap();

        let decimals_calls = evaluator
            .monitor()
            .client()
            .requests()
            .iter()
            .filter(|(_, call)| call["input"] == "0x313ce567")
            .count();
        assert_eq!(decimals_calls, 2);
    }

    #[tokio::test]
    async fn test_query_failure_aborts_pass() {
        let client = MockChainClient::new().with_native_balance(WALLET_A, HALF_BNB);

        let result = evaluator(client)
            .evaluate(&wallets(&[WALLET_A, WALLET_B]), &[native("1")])
            .await;

        assert!(result.is_err());
    }
}
