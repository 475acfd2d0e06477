//! Signing accounts.
//!
//! The wallet set is either a single locally held private key, or the accounts
//! the node itself manages (a local development node). The first account is
//! always the deployer.

use std::fmt;

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::{LocalSignerError, PrivateKeySigner};
use thiserror::Error;

use crate::net::client::{NetworkClient, TransactionRequest};
use crate::net::rpc::RpcError;
use crate::util::config::SecretKey;

/// Error resolving an account or submitting through it.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid signing key")]
    InvalidKey(#[source] LocalSignerError),

    #[error("no signing account available: the node manages no accounts and no private key is configured")]
    NoAccounts,

    #[error("failed to sign transaction")]
    Signing(#[source] alloy_signer::Error),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// The account that signs the creation transaction.
pub enum Wallet {
    /// Signs locally and broadcasts raw transactions
    Local(PrivateKeySigner),
    /// The node signs on behalf of this account
    Node(Address),
}

impl Wallet {
    /// Wallet backed by a private key.
    pub fn from_key(key: &SecretKey) -> Result<Self, WalletError> {
        let signer: PrivateKeySigner = key.expose().parse().map_err(WalletError::InvalidKey)?;
        Ok(Wallet::Local(signer))
    }

    /// First account managed by the node.
    pub fn from_node<C: NetworkClient>(client: &C) -> Result<Self, WalletError> {
        let accounts = client.accounts()?;
        accounts
            .first()
            .copied()
            .map(Wallet::Node)
            .ok_or(WalletError::NoAccounts)
    }

    /// Prefer a configured key, falling back to the node's accounts.
    pub fn resolve<C: NetworkClient>(key: Option<&SecretKey>, client: &C) -> Result<Self, WalletError> {
        match key {
            Some(key) => Self::from_key(key),
            None => Self::from_node(client),
        }
    }

    /// Deploying account address.
    pub fn address(&self) -> Address {
        match self {
            Wallet::Local(signer) => signer.address(),
            Wallet::Node(address) => *address,
        }
    }

    /// Whether transactions are signed locally.
    pub fn is_local(&self) -> bool {
        matches!(self, Wallet::Local(_))
    }

    /// Submit a contract creation and return its transaction hash.
    pub fn submit_creation<C: NetworkClient>(
        &self,
        client: &C,
        code: Bytes,
        chain_id: u64,
    ) -> Result<B256, WalletError> {
        let from = self.address();
        let request = TransactionRequest::create(from, code);

        match self {
            Wallet::Node(_) => Ok(client.send_transaction(&request)?),
            Wallet::Local(signer) => {
                let nonce = client.transaction_count(from)?;
                let gas_price = client.gas_price()?;
                let gas_limit = client.estimate_gas(&request)?;

                tracing::debug!(
                    "signing creation tx: nonce {}, gas {}, gas price {}",
                    nonce,
                    gas_limit,
                    gas_price
                );

                let tx = TxLegacy {
                    chain_id: Some(chain_id),
                    nonce,
                    gas_price,
                    gas_limit,
                    to: TxKind::Create,
                    value: U256::ZERO,
                    input: request.data,
                };
                let raw = sign_legacy(signer, tx)?;
                Ok(client.send_raw_transaction(&raw)?)
            }
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wallet::Local(signer) => f.debug_tuple("Local").field(&signer.address()).finish(),
            Wallet::Node(address) => f.debug_tuple("Node").field(address).finish(),
        }
    }
}

/// Sign an EIP-155 legacy transaction and return its raw encoding.
fn sign_legacy(signer: &PrivateKeySigner, tx: TxLegacy) -> Result<Bytes, WalletError> {
    let signature = signer
        .sign_hash_sync(&tx.signature_hash())
        .map_err(WalletError::Signing)?;
    let envelope = TxEnvelope::from(tx.into_signed(signature));
    Ok(Bytes::from(envelope.encoded_2718()))
}
