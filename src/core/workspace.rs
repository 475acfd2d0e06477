//! Workspace - the project a Courier.toml describes.
//!
//! A Workspace ties the manifest to the directory it lives in, so artifact and
//! target paths resolve the same way no matter where Courier was invoked.

use std::path::{Path, PathBuf};

use crate::core::artifact::{ArtifactError, ArtifactLocator, BuildArtifact};
use crate::core::manifest::{Manifest, ManifestError, MANIFEST_NAME};
use crate::core::target::ConsumerTarget;
use crate::util::fs::relative_path;

/// A consumer target with its path resolved against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Target as configured
    pub target: ConsumerTarget,

    /// Absolute (or root-joined) path written to
    pub path: PathBuf,
}

/// A loaded Courier project.
#[derive(Debug, Clone)]
pub struct Workspace {
    manifest: Manifest,
    manifest_path: PathBuf,
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace from a manifest path.
    pub fn new(manifest_path: &Path) -> Result<Self, ManifestError> {
        let manifest = Manifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Ok(Workspace {
            manifest,
            manifest_path: manifest_path.to_path_buf(),
            root,
        })
    }

    /// Create a workspace from an already parsed manifest.
    pub fn from_manifest(manifest: Manifest, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Workspace {
            manifest,
            manifest_path: root.join(MANIFEST_NAME),
            root,
        }
    }

    /// Get the manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Get the manifest path.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the contract this workspace deploys.
    pub fn contract_name(&self) -> &str {
        &self.manifest.contract.name
    }

    /// Locator for the compiler's artifacts directory.
    pub fn artifact_locator(&self) -> ArtifactLocator {
        let dir = &self.manifest.contract.artifacts;
        if dir.is_absolute() {
            ArtifactLocator::new(dir.clone())
        } else {
            ArtifactLocator::new(self.root.join(dir))
        }
    }

    /// Expected location of the contract's build artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.artifact_locator().path_for(
            &self.manifest.contract.name,
            self.manifest.contract.source.as_deref(),
        )
    }

    /// Load the contract's build artifact.
    pub fn load_artifact(&self) -> Result<BuildArtifact, ArtifactError> {
        BuildArtifact::load(&self.artifact_path(), &self.manifest.contract.name)
    }

    /// Consumer targets with resolved paths, in manifest order.
    pub fn targets(&self) -> Vec<ResolvedTarget> {
        self.manifest
            .targets
            .iter()
            .map(|target| ResolvedTarget {
                path: target.resolve(&self.root),
                target: target.clone(),
            })
            .collect()
    }

    /// Display a path relative to the workspace root.
    pub fn display_path(&self, path: &Path) -> String {
        relative_path(&self.root, path).display().to_string()
    }
}

/// Find the manifest in `dir` itself (no upward search).
pub fn find_manifest(dir: &Path) -> Result<PathBuf, ManifestError> {
    let path = dir.join(MANIFEST_NAME);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ManifestError::NotFound {
            dir: dir.to_path_buf(),
        })
    }
}
