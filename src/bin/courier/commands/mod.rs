//! Command implementations

pub mod artifact;
pub mod completions;
pub mod deploy;
pub mod distribute;
pub mod init;
pub mod release;

use std::path::PathBuf;

use anyhow::Result;

use courier::core::Workspace;
use courier::util::{GlobalContext, Shell};

/// State shared by every command: global flags and the output shell.
pub struct Session {
    pub ctx: GlobalContext,
    pub shell: Shell,
    manifest_path: Option<PathBuf>,
}

impl Session {
    pub fn new(ctx: GlobalContext, shell: Shell, manifest_path: Option<PathBuf>) -> Self {
        Session {
            ctx,
            shell,
            manifest_path,
        }
    }

    /// Load the workspace from `--manifest-path` or the nearest Courier.toml.
    pub fn workspace(&self) -> Result<Workspace> {
        let manifest_path = self.ctx.manifest_path(self.manifest_path.as_deref())?;
        tracing::debug!("using manifest {}", manifest_path.display());
        Ok(Workspace::new(&manifest_path)?)
    }
}
