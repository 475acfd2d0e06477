//! High-level operations.
//!
//! This module contains the implementation of Courier commands.

pub mod deploy;
pub mod distribute;
pub mod init;
pub mod pipeline;
pub mod release;

pub use deploy::{encode_constructor_args, DeployError, DeployEvent, DeployRequest, Deployer};
pub use distribute::{
    render_interface, CheckReport, CheckStatus, DistributeError, DistributionReport, Distributor,
    WriteStatus,
};
pub use init::{init_project, InitOptions};
pub use pipeline::{Chain, PipelineError, PipelineStep};
pub use release::release;
