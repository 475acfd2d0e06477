//! Courier - deploy a smart contract and ship its ABI to every consumer
//!
//! This crate provides the core library functionality for Courier:
//! reading compiler artifacts, deploying over JSON-RPC, and distributing
//! the contract interface to backend and frontend code.

pub mod core;
pub mod net;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Courier unit tests.
///
/// This module is only available when running tests. It provides a scripted
/// JSON-RPC transport and build artifact fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    artifact::BuildArtifact, deployment::DeploymentRecord, manifest::Manifest,
    target::ConsumerTarget, workspace::Workspace,
};

pub use util::context::GlobalContext;
