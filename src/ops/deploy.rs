//! Implementation of `courier deploy`.
//!
//! Deployment is never retried: a second submission after an ambiguous
//! failure could create the contract twice. Every failure is returned to the
//! operator with its original cause.

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::core::artifact::{ArtifactError, BuildArtifact};
use crate::core::deployment::DeploymentRecord;
use crate::net::client::{NetworkClient, TransactionReceipt};
use crate::net::rpc::RpcError;
use crate::net::wallet::{Wallet, WalletError};
use crate::ops::pipeline::PipelineStep;
use crate::util::config::NetworkConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("constructor of `{contract}` takes {expected} argument(s), {given} given")]
    ConstructorArity {
        contract: String,
        expected: usize,
        given: usize,
    },

    #[error("invalid constructor argument #{index} (`{param}`): `{value}`")]
    ConstructorArg {
        index: usize,
        param: String,
        value: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },

    #[error("endpoint serves chain {actual}, but chain {expected} is configured")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("creation transaction {tx_hash} reverted")]
    Reverted {
        tx_hash: B256,
        block: Option<u64>,
    },

    #[error("receipt for {tx_hash} carries no contract address")]
    NoContractAddress { tx_hash: B256 },

    #[error("no code found at {address} after creation transaction {tx_hash}")]
    NoCode { address: Address, tx_hash: B256 },
}

impl DeployError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DeployError::Artifact(e) => e.to_diagnostic(),
            DeployError::ChainMismatch { .. } => Diagnostic::error(self.to_string())
                .with_context("nothing was submitted")
                .with_suggestion(suggestions::CHECK_RPC_URL),
            DeployError::Wallet(WalletError::NoAccounts) => Diagnostic::error(self.to_string())
                .with_suggestion(suggestions::SET_PRIVATE_KEY),
            DeployError::Wallet(WalletError::InvalidKey(source)) => {
                Diagnostic::error("the configured private key is not a valid secp256k1 key")
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::SET_PRIVATE_KEY)
            }
            DeployError::Rpc(e) | DeployError::Wallet(WalletError::Rpc(e)) => {
                Diagnostic::error("network request failed")
                    .with_context(error_chain(e))
                    .with_suggestion(suggestions::CHECK_RPC_URL)
            }
            DeployError::Reverted { tx_hash, block } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("transaction: {}", tx_hash));
                if let Some(block) = block {
                    diag = diag.with_context(format!("block: {}", block));
                }
                diag.with_suggestion(suggestions::CONSTRUCTOR_REVERTED)
            }
            _ => {
                let mut diag = Diagnostic::error(self.to_string());
                if let Some(source) = std::error::Error::source(self) {
                    diag = diag.with_context(source.to_string());
                }
                diag
            }
        }
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Progress notifications emitted while deploying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// The deploying account was resolved
    Signer { address: Address, local: bool },
    /// The creation transaction was accepted by the node
    Submitted { tx_hash: B256 },
    /// Still waiting for the receipt
    Waiting { attempt: u64 },
    /// The transaction was included
    Confirmed { block: Option<u64> },
}

/// What to deploy.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub artifact: BuildArtifact,
    /// Constructor arguments, in declaration order
    pub args: Vec<String>,
}

impl DeployRequest {
    pub fn new(artifact: BuildArtifact) -> Self {
        DeployRequest {
            artifact,
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

type Observer = Box<dyn Fn(&DeployEvent)>;

/// Submits a contract creation and waits for it to be confirmed.
pub struct Deployer<C> {
    client: C,
    network: NetworkConfig,
    observer: Option<Observer>,
}

impl<C: NetworkClient> Deployer<C> {
    pub fn new(client: C, network: NetworkConfig) -> Self {
        Deployer {
            client,
            network,
            observer: None,
        }
    }

    /// Receive progress events.
    pub fn with_observer(mut self, observer: impl Fn(&DeployEvent) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Get the network client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn emit(&self, event: DeployEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Deploy `artifact` with constructor arguments `args`.
    pub fn deploy(
        &self,
        artifact: &BuildArtifact,
        args: &[String],
    ) -> Result<DeploymentRecord, DeployError> {
        let mut code = artifact.creation_code()?.to_vec();
        code.extend(encode_constructor_args(artifact, args)?);

        let chain_id = self.client.chain_id()?;
        if let Some(expected) = self.network.chain_id {
            if expected != chain_id {
                return Err(DeployError::ChainMismatch {
                    expected,
                    actual: chain_id,
                });
            }
        }

        let wallet = Wallet::resolve(self.network.signing_key.as_ref(), &self.client)?;
        let deployer = wallet.address();
        self.emit(DeployEvent::Signer {
            address: deployer,
            local: wallet.is_local(),
        });

        tracing::info!(
            "deploying {} ({} bytes) from {} on chain {}",
            artifact.contract_name(),
            code.len(),
            deployer,
            chain_id
        );

        let tx_hash = wallet.submit_creation(&self.client, Bytes::from(code), chain_id)?;
        self.emit(DeployEvent::Submitted { tx_hash });
        tracing::debug!("creation transaction submitted: {}", tx_hash);

        let receipt = self.wait_for_receipt(tx_hash)?;
        let block = receipt.block();
        self.emit(DeployEvent::Confirmed { block });

        if !receipt.succeeded() {
            return Err(DeployError::Reverted { tx_hash, block });
        }

        let address = receipt
            .contract_address
            .ok_or(DeployError::NoContractAddress { tx_hash })?;

        let runtime = self.client.code_at(address)?;
        if runtime.is_empty() {
            return Err(DeployError::NoCode { address, tx_hash });
        }

        tracing::info!("{} deployed to {}", artifact.contract_name(), address);

        Ok(DeploymentRecord {
            contract: artifact.contract_name().to_string(),
            address,
            deployer,
            chain_id,
            transaction_hash: tx_hash,
            block_number: block,
        })
    }

    /// Block until the node returns a receipt for `tx_hash`.
    ///
    /// There is no deadline here; request timeouts belong to the transport.
    fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, DeployError> {
        let mut attempt = 0;
        loop {
            if let Some(receipt) = self.client.transaction_receipt(tx_hash)? {
                return Ok(receipt);
            }
            attempt += 1;
            self.emit(DeployEvent::Waiting { attempt });
            std::thread::sleep(self.network.poll_interval);
        }
    }
}

impl<C: NetworkClient> PipelineStep for Deployer<C> {
    type Input = DeployRequest;
    type Output = DeploymentRecord;
    type Error = DeployError;

    fn name(&self) -> &'static str {
        "deploy"
    }

    fn run(&self, input: DeployRequest) -> Result<DeploymentRecord, DeployError> {
        self.deploy(&input.artifact, &input.args)
    }
}

/// ABI-encode constructor arguments against the artifact's constructor.
///
/// Each argument is given as text and coerced to the declared Solidity type
/// (`42`, `0xf39f...`, `true`, `[1,2]`).
pub fn encode_constructor_args(
    artifact: &BuildArtifact,
    args: &[String],
) -> Result<Vec<u8>, DeployError> {
    let inputs = artifact
        .abi()
        .constructor
        .as_ref()
        .map(|c| c.inputs.as_slice())
        .unwrap_or(&[]);

    if inputs.len() != args.len() {
        return Err(DeployError::ConstructorArity {
            contract: artifact.contract_name().to_string(),
            expected: inputs.len(),
            given: args.len(),
        });
    }

    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let values = inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, value))| {
            let arg_error = |source| DeployError::ConstructorArg {
                index,
                param: format!("{} {}", param.ty, param.name),
                value: value.clone(),
                source,
            };
            let ty: DynSolType = param.resolve().map_err(arg_error)?;
            ty.coerce_str(value).map_err(arg_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DynSolValue::Tuple(values).abi_encode_params())
}
