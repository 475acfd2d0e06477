//! Implementation of `courier init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{default_targets, generate_manifest, DEFAULT_ARTIFACTS_DIR};
use crate::core::{ConsumerTarget, Manifest, MANIFEST_NAME};

/// Options for creating a Courier.toml.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Contract name
    pub contract: String,

    /// Compiler artifacts directory, relative to the project root
    pub artifacts: String,

    /// Consumer targets; the backend/frontend defaults when empty
    pub targets: Vec<ConsumerTarget>,

    /// Overwrite an existing manifest
    pub force: bool,
}

impl InitOptions {
    pub fn new(contract: impl Into<String>) -> Self {
        InitOptions {
            contract: contract.into(),
            artifacts: DEFAULT_ARTIFACTS_DIR.to_string(),
            targets: Vec::new(),
            force: false,
        }
    }
}

/// Write a Courier.toml into `dir`. Returns the manifest path.
pub fn init_project(dir: &Path, opts: &InitOptions) -> Result<PathBuf> {
    if !dir.is_dir() {
        bail!("`{}` is not a directory", dir.display());
    }

    let manifest_path = dir.join(MANIFEST_NAME);
    if manifest_path.exists() && !opts.force {
        bail!(
            "`{}` already exists in `{}`\n\
             \n\
             Use `courier init --force` to overwrite it.",
            MANIFEST_NAME,
            dir.display()
        );
    }

    let targets = if opts.targets.is_empty() {
        default_targets(&opts.contract)
    } else {
        opts.targets.clone()
    };

    let contents = generate_manifest(&opts.contract, &opts.artifacts, &targets);

    // Refuse to write something `distribute` would reject.
    Manifest::parse(&contents, &manifest_path)?;

    std::fs::write(&manifest_path, &contents)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    tracing::debug!("wrote {} with {} targets", manifest_path.display(), targets.len());
    Ok(manifest_path)
}
