//! Watchdog configuration file.
//!
//! The file is read into [`RawConfig`], where every field is optional, and
//! then checked by [`RawConfig::validate`], which reports all missing
//! required fields at once. TOML is the default format; paths ending in
//! `.json` are read as JSON. The legacy JSON keys (`BotApiKey`, `ChatID`,
//! `Quantity`, `Sleep`, `WalletAddress`, `TokenContractAddress`) are accepted
//! as aliases.

use alert::MessageStyle;
use balance::{validate_address, Amount, Asset, Wallet};
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use thiserror::Error;

/// Default bound on a single RPC or notifier request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const SECS_PER_HOUR: f64 = 3600.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Missing required config fields: {}", .0.join(", "))]
    Incomplete(Vec<String>),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration as written in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    /// Network preset
    pub network: Option<NetworkType>,

    /// RPC endpoint url, overrides the preset's
    pub rpc_url: Option<String>,

    /// Native coin symbol, overrides the preset's
    pub native_symbol: Option<String>,

    /// Timeout for each RPC and notifier request
    pub rpc_timeout_secs: Option<u64>,

    /// Seconds between evaluation passes
    #[serde(alias = "Sleep")]
    pub poll_interval_secs: Option<u64>,

    /// Minimum hours between two alerts; 0 alerts on every breaching pass
    pub alert_interval_hours: Option<f64>,

    /// Threshold shared by assets that do not set their own
    #[serde(alias = "Quantity")]
    pub threshold: Option<Amount>,

    /// Watched wallet addresses
    #[serde(alias = "WalletAddress")]
    pub wallets: Option<Vec<String>>,

    /// Token contracts checked alongside the native coin, all against
    /// `threshold`
    #[serde(alias = "TokenContractAddress")]
    pub token_contracts: Option<Vec<String>>,

    /// Assets with individual thresholds, checked in this order
    pub assets: Option<Vec<RawAsset>>,

    /// Telegram bot token
    #[serde(alias = "BotApiKey")]
    pub bot_token: Option<String>,

    /// Telegram chat receiving alerts
    #[serde(alias = "ChatID")]
    pub chat_id: Option<i64>,

    /// Port for the Prometheus exporter; disabled when absent
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    #[default]
    Token,
}

/// One `[[assets]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAsset {
    #[serde(default)]
    pub kind: AssetKind,
    pub contract: Option<String>,
    pub threshold: Option<Amount>,
    pub symbol: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: NetworkConfig,
    pub rpc_timeout: Duration,
    pub poll_interval: Duration,
    pub alert_interval: Duration,
    pub wallets: Vec<Wallet>,
    pub assets: Vec<Asset>,
    pub message_style: MessageStyle,
    pub bot_token: String,
    pub chat_id: i64,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let raw = if path.extension().is_some_and(|ext| ext == "json") {
            RawConfig::from_json_str(&contents)
        } else {
            RawConfig::from_toml_str(&contents)
        }
        .map_err(|reason| ConfigError::Parse {
            path: display,
            reason,
        })?;

        raw.validate()
    }
}

impl RawConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn from_json_str(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    /// Check required fields and values.
    ///
    /// Every absent required field is listed in a single
    /// [`ConfigError::Incomplete`]; value errors are reported only once the
    /// configuration is complete.
    pub fn validate(self) -> Result<Config, ConfigError> {
        let mut missing = Vec::new();

        if self.poll_interval_secs.is_none() {
            missing.push("poll_interval_secs".to_string());
        }
        if self.wallets.is_none() {
            missing.push("wallets".to_string());
        }
        if self.bot_token.is_none() {
            missing.push("bot_token".to_string());
        }
        if self.chat_id.is_none() {
            missing.push("chat_id".to_string());
        }

        match (&self.assets, &self.token_contracts) {
            (Some(assets), _) => {
                for (i, asset) in assets.iter().enumerate() {
                    if asset.threshold.is_none() && self.threshold.is_none() {
                        missing.push(format!("assets[{i}].threshold"));
                    }
                    if asset.kind == AssetKind::Token && asset.contract.is_none() {
                        missing.push(format!("assets[{i}].contract"));
                    }
                }
            }
            (None, Some(_)) => {
                if self.threshold.is_none() {
                    missing.push("threshold".to_string());
                }
            }
            (None, None) => missing.push("assets".to_string()),
        }

        if !missing.is_empty() {
            return Err(ConfigError::Incomplete(missing));
        }

        self.into_config()
    }

    /// Convert a complete configuration, validating values.
    fn into_config(self) -> Result<Config, ConfigError> {
        let (assets, message_style) = self.build_assets()?;

        let mut network = NetworkConfigBuilder::new(self.network.unwrap_or_default());
        if let Some(rpc_url) = self.rpc_url {
            network = network.rpc_url(rpc_url);
        }
        if let Some(symbol) = self.native_symbol {
            network = network.native_symbol(symbol);
        }

        let wallets = self
            .wallets
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, address)| {
                Wallet::parse(address).map_err(|e| ConfigError::invalid(format!("wallets[{i}]"), e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if wallets.is_empty() {
            return Err(ConfigError::invalid("wallets", "at least one wallet is required"));
        }
        for (i, wallet) in wallets.iter().enumerate() {
            if let Some(first) = wallets[..i]
                .iter()
                .position(|w| w.as_str().eq_ignore_ascii_case(wallet.as_str()))
            {
                return Err(ConfigError::invalid(
                    format!("wallets[{i}]"),
                    format!("duplicate of wallets[{first}]"),
                ));
            }
        }

        let poll_interval_secs = self.poll_interval_secs.unwrap_or_default();
        if poll_interval_secs == 0 {
            return Err(ConfigError::invalid("poll_interval_secs", "must be positive"));
        }

        let alert_interval_hours = self.alert_interval_hours.unwrap_or_default();
        if !alert_interval_hours.is_finite() || alert_interval_hours < 0.0 {
            return Err(ConfigError::invalid(
                "alert_interval_hours",
                "must be a non-negative number",
            ));
        }

        let alert_interval = Duration::try_from_secs_f64(alert_interval_hours * SECS_PER_HOUR)
            .map_err(|e| ConfigError::invalid("alert_interval_hours", e))?;

        let rpc_timeout_secs = self.rpc_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if rpc_timeout_secs == 0 {
            return Err(ConfigError::invalid("rpc_timeout_secs", "must be positive"));
        }

        Ok(Config {
            network: network.build(),
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            poll_interval: Duration::from_secs(poll_interval_secs),
            alert_interval,
            wallets,
            assets,
            message_style,
            bot_token: self.bot_token.unwrap_or_default(),
            chat_id: self.chat_id.unwrap_or_default(),
            metrics_port: self.metrics_port,
        })
    }

    /// Map either asset shape onto [`Asset`]s, in file order.
    ///
    /// The flat shape checks the native coin and then each token contract
    /// against the shared threshold and renders a threshold summary; the
    /// `assets` shape renders balances per asset.
    fn build_assets(&self) -> Result<(Vec<Asset>, MessageStyle), ConfigError> {
        match (&self.assets, &self.token_contracts, &self.threshold) {
            (Some(_), Some(_), _) => Err(ConfigError::invalid(
                "token_contracts",
                "cannot be combined with assets",
            )),
            (Some(raw_assets), None, shared) => {
                let assets = raw_assets
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| raw.to_asset(i, shared.as_ref()))
                    .collect::<Result<Vec<_>, _>>()?;
                if assets.is_empty() {
                    return Err(ConfigError::invalid("assets", "at least one asset is required"));
                }
                Ok((assets, MessageStyle::TopUp))
            }
            (None, Some(contracts), Some(threshold)) => {
                let mut assets = vec![Asset::Native {
                    threshold: *threshold,
                }];
                for (i, contract) in contracts.iter().enumerate() {
                    validate_address(contract)
                        .map_err(|e| ConfigError::invalid(format!("token_contracts[{i}]"), e))?;
                    assets.push(Asset::Token {
                        contract: contract.clone(),
                        threshold: *threshold,
                        symbol: None,
                    });
                }
                Ok((
                    assets,
                    MessageStyle::ThresholdSummary {
                        threshold: *threshold,
                    },
                ))
            }
            _ => Err(ConfigError::Incomplete(vec!["assets".to_string()])),
        }
    }
}

impl RawAsset {
    fn to_asset(&self, index: usize, shared: Option<&Amount>) -> Result<Asset, ConfigError> {
        let threshold = self
            .threshold
            .or_else(|| shared.copied())
            .ok_or_else(|| ConfigError::Incomplete(vec![format!("assets[{index}].threshold")]))?;

        match self.kind {
            AssetKind::Native => Ok(Asset::Native { threshold }),
            AssetKind::Token => {
                let contract = self.contract.clone().ok_or_else(|| {
                    ConfigError::Incomplete(vec![format!("assets[{index}].contract")])
                })?;
                validate_address(&contract)
                    .map_err(|e| ConfigError::invalid(format!("assets[{index}].contract"), e))?;
                Ok(Asset::Token {
                    contract,
                    threshold,
                    symbol: self.symbol.clone(),
                })
            }
        }
    }
}
