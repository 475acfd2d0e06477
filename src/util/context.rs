//! Global context for Courier operations.
//!
//! Provides centralized access to the working directory, the global Courier
//! home and the layered configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::workspace::find_manifest as ws_find_manifest;
use crate::core::ManifestError;
use crate::util::config::{self, Config};

/// Environment variable overriding the global Courier home (~/.courier/).
pub const HOME_ENV: &str = "COURIER_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Courier data (~/.courier/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => config::global_config_dir().unwrap_or_else(|| PathBuf::from(".courier")),
        };

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a specific home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Courier home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path for a workspace root.
    pub fn project_config_path(&self, root: &Path) -> PathBuf {
        root.join(".courier").join("config.toml")
    }

    /// Load the global and project configuration, project values winning.
    pub fn load_config(&self, root: &Path) -> Result<Config> {
        config::load_config(&self.config_path(), &self.project_config_path(root))
    }

    /// Find Courier.toml starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            match ws_find_manifest(&current) {
                Ok(path) => return Ok(path),
                Err(ManifestError::NotFound { .. }) => {
                    if !current.pop() {
                        return Err(ManifestError::NotFound {
                            dir: self.cwd.clone(),
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolve the manifest: an explicit path wins over discovery.
    pub fn manifest_path(&self, explicit: Option<&Path>) -> Result<PathBuf, ManifestError> {
        match explicit {
            Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
            Some(path) => Ok(self.cwd.join(path)),
            None => self.find_manifest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MANIFEST_NAME;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new()
            .unwrap()
            .with_home(PathBuf::from("/tmp/courier-home"));
        assert!(ctx.cwd().is_absolute());
        assert_eq!(ctx.config_path(), PathBuf::from("/tmp/courier-home/config.toml"));
        assert_eq!(
            ctx.project_config_path(Path::new("/project")),
            PathBuf::from("/project/.courier/config.toml")
        );
    }

    #[test]
    fn test_find_manifest_searches_upward() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "").unwrap();
        let nested = tmp.path().join("backend/app");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested).unwrap();
        assert_eq!(ctx.find_manifest().ok(), Some(manifest));
    }

    #[test]
    fn test_explicit_manifest_path() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work")).unwrap();
        assert_eq!(
            ctx.manifest_path(Some(Path::new("sub/Courier.toml"))).unwrap(),
            PathBuf::from("/work/sub/Courier.toml")
        );
    }

    #[test]
    fn test_load_config_layers() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let root = tmp.path().join("project");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(root.join(".courier")).unwrap();
        std::fs::write(
            home.join("config.toml"),
            "[network]\nrpc_url = \"http://global:8545\"\nchain_id = 1\n",
        )
        .unwrap();
        std::fs::write(
            root.join(".courier/config.toml"),
            "[network]\nrpc_url = \"http://project:8545\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(root.clone()).unwrap().with_home(home);
        let config = ctx.load_config(&root).unwrap();
        assert_eq!(config.network.rpc_url.as_deref(), Some("http://project:8545"));
        assert_eq!(config.network.chain_id, Some(1));
    }
}
