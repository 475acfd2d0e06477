//! Test utilities and mocks for Courier unit tests.
//!
//! [`MockTransport`] stands in for a JSON-RPC node: tests script a response
//! per method and inspect the calls afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = MockTransport::new();
//! transport.respond("eth_chainId", json!("0x7a69"));
//! transport.respond_once("eth_getTransactionReceipt", json!(null));
//!
//! let client = RpcClient::new(transport);
//! assert_eq!(client.chain_id().unwrap(), 31337);
//! ```

pub mod fixtures;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy_primitives::{address, Address};
use serde_json::Value;

use crate::net::rpc::{RpcError, Transport};

pub use fixtures::*;

/// First account of a local development node (Hardhat/Anvil).
pub const DEV_ACCOUNT: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Well-known private key of [`DEV_ACCOUNT`]. Never holds real funds.
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

type Reply = Result<Value, (i64, String)>;

#[derive(Debug, Default)]
struct Script {
    persistent: HashMap<String, Reply>,
    queued: HashMap<String, VecDeque<Reply>>,
    calls: Vec<(String, Value)>,
}

/// Scripted JSON-RPC transport.
///
/// Queued one-shot replies are served first, then the persistent reply.
/// A method with no reply fails like a node that does not support it.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<Script>,
}

impl MockTransport {
    /// Create a transport with nothing scripted.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Answer every call to `method` with `result`.
    pub fn respond(&self, method: &str, result: Value) {
        self.lock().persistent.insert(method.to_string(), Ok(result));
    }

    /// Answer the next call to `method` with `result`.
    pub fn respond_once(&self, method: &str, result: Value) {
        self.lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(result));
    }

    /// Answer every call to `method` with a JSON-RPC error.
    pub fn respond_error(&self, method: &str, code: i64, message: &str) {
        self.lock()
            .persistent
            .insert(method.to_string(), Err((code, message.to_string())));
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for MockTransport {
    fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let mut script = self.lock();
        script.calls.push((method.to_string(), params));

        let reply = script
            .queued
            .get_mut(method)
            .and_then(|queue| queue.pop_front())
            .or_else(|| script.persistent.get(method).cloned())
            .unwrap_or_else(|| Err((-32601, "the method does not exist".to_string())));

        reply.map_err(|(code, message)| RpcError::Node {
            method: method.to_string(),
            code,
            message,
            data: None,
        })
    }

    fn endpoint(&self) -> String {
        "mock://node".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_once_replies_take_priority() {
        let transport = MockTransport::new();
        transport.respond("eth_blockNumber", json!("0x2"));
        transport.respond_once("eth_blockNumber", json!("0x1"));

        assert_eq!(transport.request("eth_blockNumber", json!([])).unwrap(), json!("0x1"));
        assert_eq!(transport.request("eth_blockNumber", json!([])).unwrap(), json!("0x2"));
        assert_eq!(transport.request("eth_blockNumber", json!([])).unwrap(), json!("0x2"));
        assert_eq!(transport.calls().len(), 3);
    }

    #[test]
    fn test_unscripted_method_fails() {
        let transport = MockTransport::new();
        let err = transport.request("eth_call", json!([])).unwrap_err();
        assert!(matches!(err, RpcError::Node { code: -32601, .. }));
    }
}
