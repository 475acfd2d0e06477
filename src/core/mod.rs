//! Core data structures for Courier.
//!
//! This module contains the foundational types used throughout Courier:
//! - Build artifacts produced by the contract compiler
//! - Consumer targets and the Courier.toml manifest
//! - Deployment records
//! - Workspace management

pub mod artifact;
pub mod deployment;
pub mod manifest;
pub mod target;
pub mod workspace;

pub use artifact::{ArtifactError, ArtifactLocator, BuildArtifact};
pub use deployment::DeploymentRecord;
pub use manifest::{Manifest, ManifestError, MANIFEST_NAME};
pub use target::{ConsumerRole, ConsumerTarget};
pub use workspace::{find_manifest, ResolvedTarget, Workspace};
