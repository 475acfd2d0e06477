//! `courier init` command

use anyhow::{anyhow, Result};

use crate::cli::InitArgs;
use crate::commands::Session;
use courier::core::{ConsumerRole, ConsumerTarget};
use courier::ops::{init_project, InitOptions};
use courier::util::Status;

pub fn execute(args: InitArgs, session: &Session) -> Result<()> {
    let dir = match args.path {
        Some(path) if path.is_absolute() => path,
        Some(path) => session.ctx.cwd().join(path),
        None => session.ctx.cwd().to_path_buf(),
    };

    let targets = args
        .targets
        .iter()
        .map(|spec| parse_target(spec))
        .collect::<Result<Vec<_>>>()?;

    let opts = InitOptions {
        contract: args.contract,
        artifacts: args.artifacts,
        targets,
        force: args.force,
    };

    let manifest_path = init_project(&dir, &opts)?;
    session.shell.status(
        Status::Created,
        format!("{} for `{}`", manifest_path.display(), opts.contract),
    );

    Ok(())
}

/// Parse `ROLE=PATH`.
fn parse_target(spec: &str) -> Result<ConsumerTarget> {
    let (role, path) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid target `{}`; expected ROLE=PATH", spec))?;
    if path.trim().is_empty() {
        return Err(anyhow!("invalid target `{}`: empty path", spec));
    }
    let role: ConsumerRole = role.parse().map_err(|e: String| anyhow!(e))?;
    Ok(ConsumerTarget::new(path.trim(), role))
}
