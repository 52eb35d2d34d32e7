//! In-memory chain client for unit tests.

use alloy_primitives::hex;
use client::{ChainClient, ClientError};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

pub const WALLET_A: &str = "0xAAAA000000000000000000000000000000001111";
pub const WALLET_B: &str = "0xBBBB000000000000000000000000000000002222";
pub const TOKEN: &str = "0x55d398326f99059fF775485246999027B3197955";

/// Encode `n` as a 32-byte `eth_call` result word.
pub fn word(n: u64) -> String {
    format!("0x{n:064x}")
}

/// Encode `s` as an ABI `string` return value.
pub fn abi_string(s: &str) -> String {
    let mut data = hex::encode(s.as_bytes());
    let padded_len = data.len().div_ceil(64).max(1) * 64;
    data.push_str(&"0".repeat(padded_len - data.len()));
    format!("0x{:064x}{:064x}{data}", 32, s.len())
}

/// Chain client answering from canned responses and recording every request.
#[derive(Debug, Clone, Default)]
pub struct MockChainClient {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn respond(self, key: String, result: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(key, Value::from(result));
        self
    }

    pub fn with_native_balance(self, address: &str, result: &str) -> Self {
        self.respond(format!("eth_getBalance:{address}"), result)
    }

    pub fn with_call(self, contract: &str, input: &str, result: &str) -> Self {
        self.respond(format!("eth_call:{contract}:{input}"), result)
    }

    pub fn with_token_balance(self, contract: &str, owner: &str, result: &str) -> Self {
        let input = format!("0x70a08231{:0>64}", &owner[2..]);
        self.with_call(contract, &input, result)
    }

    pub fn with_token_decimals(self, contract: &str, result: &str) -> Self {
        self.with_call(contract, "0x313ce567", result)
    }

    pub fn with_token_symbol(self, contract: &str, result: &str) -> Self {
        self.with_call(contract, "0x95d89b41", result)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChainClient for MockChainClient {
    async fn call_latest(&self, method: &'static str, target: Value) -> Result<Value, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), target.clone()));

        let key = match &target {
            Value::String(address) => format!("{method}:{address}"),
            call => format!(
                "{method}:{}:{}",
                call["to"].as_str().unwrap_or_default(),
                call["input"].as_str().unwrap_or_default()
            ),
        };

        self.responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| ClientError::Transport {
                method,
                reason: format!("no canned response for {key}"),
            })
    }
}
