//! Network client operations used by the deployer.

use alloy_primitives::{Address, Bytes, B256, U128, U256, U64};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::net::rpc::{RpcClient, RpcError, Transport};

/// A transaction for the node to fill, sign or estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,

    /// `None` creates a contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,

    pub data: Bytes,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U128>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U64>,
}

impl TransactionRequest {
    /// A contract creation sent from `from`.
    pub fn create(from: Address, data: Bytes) -> Self {
        TransactionRequest {
            from,
            data,
            ..Default::default()
        }
    }
}

/// The parts of a transaction receipt Courier reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,

    #[serde(default)]
    pub block_number: Option<U64>,

    #[serde(default)]
    pub contract_address: Option<Address>,

    /// `0x1` success, `0x0` reverted; absent on pre-Byzantium chains
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    /// Whether the transaction executed without reverting.
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1u64)).unwrap_or(true)
    }

    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}

/// Operations the deployer needs from the network.
pub trait NetworkClient {
    /// Chain id the endpoint serves.
    fn chain_id(&self) -> Result<u64, RpcError>;

    /// Accounts the node can sign for.
    fn accounts(&self) -> Result<Vec<Address>, RpcError>;

    /// Next nonce for `address`, counting pending transactions.
    fn transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// Current gas price in wei.
    fn gas_price(&self) -> Result<u128, RpcError>;

    /// Gas the transaction is expected to use.
    fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, RpcError>;

    /// Have the node sign and broadcast a transaction.
    fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, RpcError>;

    /// Broadcast a locally signed transaction.
    fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, RpcError>;

    /// Receipt for `hash`, or `None` while it is still pending.
    fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, RpcError>;

    /// Runtime code stored at `address`.
    fn code_at(&self, address: Address) -> Result<Bytes, RpcError>;
}

impl<T: Transport> NetworkClient for RpcClient<T> {
    fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = self.call("eth_chainId", json!([]))?;
        Ok(id.to::<u64>())
    }

    fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.call("eth_accounts", json!([]))
    }

    fn transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let count: U64 = self.call("eth_getTransactionCount", json!([address, "pending"]))?;
        Ok(count.to::<u64>())
    }

    fn gas_price(&self) -> Result<u128, RpcError> {
        let price: U128 = self.call("eth_gasPrice", json!([]))?;
        Ok(price.to::<u128>())
    }

    fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, RpcError> {
        let gas: U64 = self.call("eth_estimateGas", json!([tx]))?;
        Ok(gas.to::<u64>())
    }

    fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, RpcError> {
        self.call("eth_sendTransaction", json!([tx]))
    }

    fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, RpcError> {
        self.call("eth_sendRawTransaction", json!([raw]))
    }

    fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, RpcError> {
        self.call("eth_getTransactionReceipt", json!([hash]))
    }

    fn code_at(&self, address: Address) -> Result<Bytes, RpcError> {
        self.call("eth_getCode", json!([address, "latest"]))
    }
}
