//! Compiler build artifacts.
//!
//! A build artifact is the JSON document the contract compiler writes for a
//! single contract. Courier reads it and never modifies it. The on-disk layout
//! follows Hardhat:
//!
//! ```text
//! <artifacts>/contracts/CultureProof.sol/CultureProof.json
//! ```
//!
//! Only the `abi` field is required to distribute the interface. Deployment
//! additionally needs a fully linked `bytecode`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Placeholder the compiler leaves in bytecode for an unlinked library.
static LIBRARY_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__\$[0-9a-fA-F]{34}\$__").expect("valid placeholder regex"));

/// Error while locating or reading a build artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("build artifact for `{contract}` not found at {}", path.display())]
    Missing { contract: String, path: PathBuf },

    #[error("failed to read build artifact {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed build artifact {}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl ArtifactError {
    fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        ArtifactError::Malformed {
            path: path.to_path_buf(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ArtifactError::Missing { contract, path } => {
                Diagnostic::error(format!("no build artifact for `{}`", contract))
                    .with_location(path)
                    .with_context("the compile step has not produced this file")
                    .with_suggestion(suggestions::COMPILE_CONTRACTS)
                    .with_suggestion(suggestions::CHECK_ARTIFACTS_DIR)
            }
            ArtifactError::Read { path, source } => {
                Diagnostic::error("failed to read build artifact")
                    .with_location(path)
                    .with_context(source.to_string())
            }
            ArtifactError::Malformed {
                path,
                reason,
                source,
            } => {
                let mut diag = Diagnostic::error(format!("malformed build artifact: {}", reason))
                    .with_location(path);
                if let Some(source) = source {
                    diag = diag.with_context(source.to_string());
                }
                diag.with_suggestion(suggestions::COMPILE_CONTRACTS)
            }
        }
    }
}

/// Locates build artifacts under a compiler output directory.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    artifacts_dir: PathBuf,
}

impl ArtifactLocator {
    /// Create a locator rooted at the compiler's artifacts directory.
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        ArtifactLocator {
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// The artifacts directory.
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Expected artifact path for a contract.
    ///
    /// `source` is the contract's source file relative to the project
    /// (`contracts/CultureProof.sol`); it defaults to `contracts/<name>.sol`.
    pub fn path_for(&self, contract: &str, source: Option<&str>) -> PathBuf {
        let source = source
            .map(str::to_string)
            .unwrap_or_else(|| format!("contracts/{}.sol", contract));
        self.artifacts_dir
            .join(source)
            .join(format!("{}.json", contract))
    }

    /// Locate and load the artifact for a contract.
    pub fn load(&self, contract: &str, source: Option<&str>) -> Result<BuildArtifact, ArtifactError> {
        BuildArtifact::load(&self.path_for(contract, source), contract)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    abi: Option<serde_json::Value>,
    bytecode: Option<String>,
    deployed_bytecode: Option<String>,
    #[serde(default)]
    link_references: serde_json::Map<String, serde_json::Value>,
}

/// Compiler output for one contract.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    contract_name: String,
    source_name: Option<String>,
    path: PathBuf,
    /// ABI exactly as the compiler wrote it, key order included.
    abi_json: serde_json::Value,
    abi: JsonAbi,
    bytecode: Option<String>,
    deployed_bytecode: Option<String>,
    unlinked_libraries: Vec<String>,
}

impl BuildArtifact {
    /// Load an artifact from disk.
    ///
    /// A missing file is reported separately from unreadable or invalid
    /// content so the operator can tell a skipped compile step from a
    /// corrupted one.
    pub fn load(path: &Path, contract: &str) -> Result<Self, ArtifactError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArtifactError::Missing {
                    contract: contract.to_string(),
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(ArtifactError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&contents, path, contract)
    }

    /// Parse artifact JSON. `path` is only used for error reporting.
    pub fn parse(contents: &str, path: &Path, contract: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact =
            serde_json::from_str(contents).map_err(|e| ArtifactError::Malformed {
                path: path.to_path_buf(),
                reason: "not valid JSON".to_string(),
                source: Some(e),
            })?;

        let abi_json = raw
            .abi
            .ok_or_else(|| ArtifactError::malformed(path, "missing `abi` field"))?;

        if !abi_json.is_array() {
            return Err(ArtifactError::malformed(path, "`abi` is not a JSON array"));
        }

        let abi: JsonAbi =
            serde_json::from_value(abi_json.clone()).map_err(|e| ArtifactError::Malformed {
                path: path.to_path_buf(),
                reason: "`abi` does not describe a contract interface".to_string(),
                source: Some(e),
            })?;

        if let Some(name) = &raw.contract_name {
            if name != contract {
                return Err(ArtifactError::malformed(
                    path,
                    format!("artifact is for `{}`, expected `{}`", name, contract),
                ));
            }
        }

        let mut unlinked_libraries: Vec<String> = raw
            .link_references
            .values()
            .filter_map(|libs| libs.as_object())
            .flat_map(|libs| libs.keys().cloned())
            .collect();
        unlinked_libraries.sort();

        Ok(BuildArtifact {
            contract_name: contract.to_string(),
            source_name: raw.source_name,
            path: path.to_path_buf(),
            abi_json,
            abi,
            bytecode: raw.bytecode,
            deployed_bytecode: raw.deployed_bytecode,
            unlinked_libraries,
        })
    }

    /// Contract name.
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// Source file the contract was compiled from, if recorded.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Path the artifact was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The interface description exactly as stored in the artifact.
    pub fn abi_json(&self) -> &serde_json::Value {
        &self.abi_json
    }

    /// The typed interface description.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Whether the artifact carries deployable bytecode.
    pub fn has_bytecode(&self) -> bool {
        self.bytecode
            .as_deref()
            .map(|code| !strip_hex_prefix(code).is_empty())
            .unwrap_or(false)
    }

    /// Size of the runtime bytecode in bytes, when recorded.
    pub fn deployed_size(&self) -> Option<usize> {
        self.deployed_bytecode
            .as_deref()
            .map(|code| strip_hex_prefix(code).len() / 2)
    }

    /// Decode the creation bytecode.
    ///
    /// Fails if the bytecode is absent, empty, still references unlinked
    /// libraries, or is not valid hex.
    pub fn creation_code(&self) -> Result<Bytes, ArtifactError> {
        let code = self
            .bytecode
            .as_deref()
            .ok_or_else(|| ArtifactError::malformed(&self.path, "missing `bytecode` field"))?;

        let hex_code = strip_hex_prefix(code);
        if hex_code.is_empty() {
            return Err(ArtifactError::malformed(
                &self.path,
                "`bytecode` is empty (abstract contract or interface?)",
            ));
        }

        if !self.unlinked_libraries.is_empty() || LIBRARY_PLACEHOLDER.is_match(hex_code) {
            let libs = if self.unlinked_libraries.is_empty() {
                "unknown".to_string()
            } else {
                self.unlinked_libraries.join(", ")
            };
            return Err(ArtifactError::malformed(
                &self.path,
                format!("`bytecode` references unlinked libraries: {}", libs),
            ));
        }

        hex::decode(hex_code).map(Bytes::from).map_err(|e| {
            ArtifactError::malformed(&self.path, format!("`bytecode` is not valid hex: {}", e))
        })
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
