//! Consumer targets: the locations that hold a copy of the contract ABI.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who reads the ABI copy at a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConsumerRole {
    Backend,
    Frontend,
    Other(String),
}

impl ConsumerRole {
    pub fn as_str(&self) -> &str {
        match self {
            ConsumerRole::Backend => "backend",
            ConsumerRole::Frontend => "frontend",
            ConsumerRole::Other(name) => name,
        }
    }
}

impl From<String> for ConsumerRole {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "backend" => ConsumerRole::Backend,
            "frontend" => ConsumerRole::Frontend,
            _ => ConsumerRole::Other(s),
        }
    }
}

impl From<ConsumerRole> for String {
    fn from(role: ConsumerRole) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for ConsumerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("consumer role must not be empty".to_string());
        }
        Ok(ConsumerRole::from(s.to_string()))
    }
}

impl fmt::Display for ConsumerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location that must hold a synchronized copy of the ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerTarget {
    /// File path, relative to the manifest directory unless absolute
    pub path: PathBuf,

    /// Consumer reading this copy
    pub role: ConsumerRole,
}

impl ConsumerTarget {
    pub fn new(path: impl Into<PathBuf>, role: ConsumerRole) -> Self {
        ConsumerTarget {
            path: path.into(),
            role,
        }
    }

    /// Resolve the target path against the project root.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            root.join(&self.path)
        }
    }
}

impl fmt::Display for ConsumerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.role)
    }
}
