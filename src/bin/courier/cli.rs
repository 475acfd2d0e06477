//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use courier::util::ColorChoice;

/// Courier - deploy a smart contract and ship its ABI to every consumer
#[derive(Parser)]
#[command(name = "courier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Path to Courier.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a Courier.toml in the current directory
    Init(InitArgs),

    /// Deploy the contract to the configured network
    Deploy(DeployArgs),

    /// Copy the contract ABI to every consumer target
    Distribute(DistributeArgs),

    /// Deploy, then distribute
    Release(DeployArgs),

    /// Show the resolved build artifact
    Artifact,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Contract name
    #[arg(long, default_value = "CultureProof")]
    pub contract: String,

    /// Compiler artifacts directory
    #[arg(long, default_value = courier::core::manifest::DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: String,

    /// Consumer target as ROLE=PATH (repeatable; default: backend and frontend)
    #[arg(long = "target", value_name = "ROLE=PATH")]
    pub targets: Vec<String>,

    /// Overwrite an existing Courier.toml
    #[arg(long)]
    pub force: bool,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct NetworkArgs {
    /// JSON-RPC endpoint
    #[arg(long, env = "COURIER_RPC_URL", value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Hex private key used to sign locally (default: the node's first account)
    #[arg(long, env = "COURIER_PRIVATE_KEY", hide_env_values = true, value_name = "KEY")]
    pub private_key: Option<String>,

    /// Abort unless the endpoint serves this chain
    #[arg(long, env = "COURIER_CHAIN_ID", value_name = "ID")]
    pub chain_id: Option<u64>,
}

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Constructor argument, in declaration order (repeatable)
    #[arg(long = "arg", value_name = "VALUE", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Write the deployment record as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub record: Option<PathBuf>,
}

#[derive(Args)]
pub struct DistributeArgs {
    /// Verify the targets are up to date without writing
    #[arg(long)]
    pub check: bool,

    /// Write targets one at a time
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
