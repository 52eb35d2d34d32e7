use crate::{
    codec::{decode_abi_string, decode_hex_or_decimal, decode_quantity},
    Amount, Balance, BalanceQuery, Monitor, Wallet, NATIVE_DECIMALS,
};
use alloy_primitives::U256;
use binding::{selector_hex, BALANCE_OF, DECIMALS, SYMBOL};
use client::ChainClient;
use eyre::{bail, Result, WrapErr};
use serde_json::{json, Value};
use tracing::debug;

// Balance monitor implementation.
pub struct BalanceMonitor<C> {
    client: C,
}

impl<C> BalanceMonitor<C>
where
    C: ChainClient,
{
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Raw native balance in wei.
    pub async fn native_balance(&self, address: &Wallet) -> Result<U256> {
        debug!("Querying native balance: address={}", address);

        let value = self
            .client
            .call_latest("eth_getBalance", Value::from(address.as_str()))
            .await
            .wrap_err_with(|| format!("Failed to get native balance of {address}"))?;

        Ok(decode_quantity(&value)?)
    }

    /// Read-only contract call with `selector ++ args` as input. Returns the
    /// raw hex result.
    pub async fn raw_call(&self, contract: &str, selector: &str, args: &str) -> Result<String> {
        let input = format!("{selector}{args}");
        // Nodes differ on which key they read the payload from.
        let call = json!({
            "to": contract,
            "input": input,
            "data": input,
        });

        let value = self
            .client
            .call_latest("eth_call", call)
            .await
            .wrap_err_with(|| format!("Failed to call {selector} on {contract}"))?;

        match value {
            Value::String(result) => Ok(result),
            other => bail!("eth_call {selector} on {contract} returned a non-string result: {other}"),
        }
    }

    /// Raw ERC20 balance of `owner`.
    pub async fn token_balance(&self, contract: &str, owner: &Wallet) -> Result<U256> {
        debug!("Querying erc20 {} balance: address={}", contract, owner);

        let args = format!("{:0>64}", owner.hex_digits());
        let result = self
            .raw_call(contract, &selector_hex(BALANCE_OF), &args)
            .await?;

        decode_hex_or_decimal(&result)
            .wrap_err_with(|| format!("Failed to decode balanceOf result from {contract}"))
    }

    pub async fn token_decimals(&self, contract: &str) -> Result<u8> {
        let result = self.raw_call(contract, &selector_hex(DECIMALS), "").await?;
        let decimals = decode_hex_or_decimal(&result)
            .wrap_err_with(|| format!("Failed to decode decimals result from {contract}"))?;

        if decimals > U256::from(crate::amount::MAX_SCALE) {
            bail!("Token {contract} reports unsupported decimals {decimals}");
        }
        Ok(decimals.to::<u8>())
    }

    pub async fn token_symbol(&self, contract: &str) -> Result<String> {
        let result = self.raw_call(contract, &selector_hex(SYMBOL), "").await?;

        decode_abi_string(&result)
            .wrap_err_with(|| format!("Failed to decode symbol result from {contract}"))
    }

    async fn query_native(&self, address: Wallet) -> Result<Balance> {
        let raw = self.native_balance(&address).await?;

        Ok(Balance {
            holder: address,
            token: None,
            amount: Amount::from_raw(raw, NATIVE_DECIMALS)?,
        })
    }

    async fn query_erc20(&self, token: String, holder: Wallet) -> Result<Balance> {
        let raw = self.token_balance(&token, &holder).await?;
        // Decimals are never cached across queries.
        let decimals = self.token_decimals(&token).await?;
        let amount = Amount::from_raw(raw, decimals)?;

        Ok(Balance {
            holder,
            token: Some(token),
            amount,
        })
    }
}

impl<C> Monitor for BalanceMonitor<C>
where
    C: ChainClient,
{
    async fn query_balance(&self, query: BalanceQuery) -> Result<Balance> {
        match query {
            BalanceQuery::ERC20Balance { token, holder } => self.query_erc20(token, holder).await,
            BalanceQuery::NativeBalance { address } => self.query_native(address).await,
        }
    }

    async fn query_symbol(&self, token: &str) -> Result<String> {
        self.token_symbol(token).await
    }
}
