//! Implementation of `courier release`: deploy, then distribute.
//!
//! Distribution only runs once the contract is confirmed on chain. A failed
//! distribution does not undo the deployment; the returned error names the
//! step that failed so the operator knows whether to re-run `distribute`
//! alone.

use crate::core::deployment::DeploymentRecord;
use crate::net::client::NetworkClient;
use crate::ops::deploy::{DeployRequest, Deployer};
use crate::ops::distribute::{DistributionReport, Distributor};
use crate::ops::pipeline::{PipelineError, PipelineStep};

/// Deploy the contract, then copy its ABI to every target.
pub fn release<C: NetworkClient>(
    deployer: Deployer<C>,
    distributor: Distributor,
    request: DeployRequest,
) -> Result<(DeploymentRecord, DistributionReport), PipelineError> {
    deployer.then(distributor).run(request)
}
