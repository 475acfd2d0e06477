//! Network access: JSON-RPC transport, typed client, and signing accounts.

pub mod client;
pub mod rpc;
pub mod wallet;

pub use client::{NetworkClient, TransactionReceipt, TransactionRequest};
pub use rpc::{HttpTransport, RpcClient, RpcError, Transport};
pub use wallet::{Wallet, WalletError};

/// The production client: JSON-RPC over HTTP.
pub type HttpClient = RpcClient<HttpTransport>;
