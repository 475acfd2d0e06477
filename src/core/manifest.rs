//! Courier.toml manifest parsing.
//!
//! The manifest names the contract whose artifact Courier reads and the fixed
//! set of consumer targets the ABI is distributed to:
//!
//! ```toml
//! [contract]
//! name = "CultureProof"
//! artifacts = "contracts/artifacts"
//!
//! [[targets]]
//! path = "backend/app/services/culture_proof_abi.json"
//! role = "backend"
//! ```

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::target::{ConsumerRole, ConsumerTarget};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Courier.toml";

/// Default compiler output directory, relative to the manifest.
pub const DEFAULT_ARTIFACTS_DIR: &str = "contracts/artifacts";

/// Error loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Courier.toml` in `{}` or any parent directory", dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl ManifestError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ManifestError::NotFound { dir } => Diagnostic::error(self.to_string())
                .with_location(dir)
                .with_suggestion(suggestions::NO_MANIFEST),
            ManifestError::Read { path, source } => Diagnostic::error("failed to read manifest")
                .with_location(path)
                .with_context(source.to_string()),
            ManifestError::Parse { path, source } => {
                Diagnostic::error("failed to parse manifest")
                    .with_location(path)
                    .with_context(source.to_string())
            }
            ManifestError::Invalid { path, reason } => {
                Diagnostic::error(format!("invalid manifest: {}", reason)).with_location(path)
            }
        }
    }
}

/// The `[contract]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSection {
    /// Contract name, as the compiler names the artifact
    pub name: String,

    /// Compiler artifacts directory
    #[serde(default = "default_artifacts_dir")]
    pub artifacts: PathBuf,

    /// Source file the contract lives in (defaults to `contracts/<name>.sol`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

/// Parsed Courier.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub contract: ContractSection,

    #[serde(default)]
    pub targets: Vec<ConsumerTarget>,
}

impl Manifest {
    /// Load and validate a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents, path)
    }

    /// Parse and validate manifest contents. `path` is used for error reporting.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<(), ManifestError> {
        let invalid = |reason: String| ManifestError::Invalid {
            path: path.to_path_buf(),
            reason,
        };

        if self.contract.name.trim().is_empty() {
            return Err(invalid("`contract.name` must not be empty".to_string()));
        }

        if self.targets.is_empty() {
            return Err(invalid("at least one `[[targets]]` entry is required".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.path.as_os_str().is_empty() {
                return Err(invalid("target path must not be empty".to_string()));
            }
            if !seen.insert(normalize(&target.path)) {
                return Err(invalid(format!(
                    "target `{}` is listed more than once",
                    target.path.display()
                )));
            }
        }

        Ok(())
    }
}

/// Lexical form used to compare target paths: `./abi.json` and `abi.json`
/// name the same file.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Render a new manifest for `courier init`.
pub fn generate_manifest(contract: &str, artifacts: &str, targets: &[ConsumerTarget]) -> String {
    let mut out = format!(
        r#"[contract]
name = "{contract}"
artifacts = "{artifacts}"
"#
    );

    for target in targets {
        out.push_str(&format!(
            r#"
[[targets]]
path = "{}"
role = "{}"
"#,
            target.path.display(),
            target.role
        ));
    }

    out
}

/// Default consumer targets: one backend copy and one frontend copy.
pub fn default_targets(contract: &str) -> Vec<ConsumerTarget> {
    let file = format!("{}_abi.json", snake_case(contract));
    vec![
        ConsumerTarget::new(
            Path::new("backend/app/services").join(&file),
            ConsumerRole::Backend,
        ),
        ConsumerTarget::new(Path::new("frontend/assets").join(&file), ConsumerRole::Frontend),
    ]
}

/// `CultureProof` -> `culture_proof`
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
