//! `courier deploy` command

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::cli::{DeployArgs, NetworkArgs};
use crate::commands::Session;
use courier::core::{DeploymentRecord, Workspace};
use courier::net::{HttpClient, Transport};
use courier::ops::{DeployEvent, Deployer};
use courier::util::config::{NetworkConfig, NetworkOverrides, SecretKey};
use courier::util::shell::Spinner;
use courier::util::{Shell, Status};

pub fn execute(args: DeployArgs, session: &Session) -> Result<()> {
    let ws = session.workspace()?;
    let artifact = ws.load_artifact()?;

    let (deployer, spinner) = connect(&args.network, &ws, session)?;
    let record = deployer.deploy(&artifact, &args.args)?;
    spinner.finish();

    report_deployment(&record, args.record.as_deref(), session)
}

/// Resolve the network settings and build a deployer that reports progress
/// through the shell.
pub(crate) fn connect(
    args: &NetworkArgs,
    ws: &Workspace,
    session: &Session,
) -> Result<(Deployer<HttpClient>, Rc<Spinner>)> {
    let overrides = NetworkOverrides {
        rpc_url: args.rpc_url.clone(),
        private_key: args.private_key.clone().map(SecretKey::new),
        chain_id: args.chain_id,
    }
    .with_fallbacks(|name| std::env::var(name).ok())?;

    let config = session.ctx.load_config(ws.root())?;
    let network = NetworkConfig::resolve(overrides, &config)?;
    let client = network.connect()?;

    tracing::debug!(
        "endpoint {}, chain id {:?}, signer {}",
        client.transport().endpoint(),
        network.chain_id,
        if network.signing_key.is_some() { "local key" } else { "node account" }
    );

    let spinner = Rc::new(session.shell.spinner("connecting"));
    let observer = progress_observer(
        ws.contract_name().to_string(),
        session.shell.clone(),
        Rc::clone(&spinner),
    );

    Ok((Deployer::new(client, network).with_observer(observer), spinner))
}

fn progress_observer(
    contract: String,
    shell: Shell,
    spinner: Rc<Spinner>,
) -> impl Fn(&DeployEvent) + 'static {
    move |event| match event {
        DeployEvent::Signer { address, local } => {
            let kind = if *local { "local key" } else { "node account" };
            spinner.println(
                &shell,
                Status::Deploying,
                format!("{} with account {} ({})", contract, address, kind),
            );
            spinner.set_message("submitting creation transaction");
        }
        DeployEvent::Submitted { tx_hash } => {
            spinner.println(&shell, Status::Info, format!("transaction {}", tx_hash));
            spinner.set_message("waiting for confirmation");
        }
        DeployEvent::Waiting { attempt } => {
            tracing::debug!("receipt not available yet (poll {})", attempt);
            spinner.set_message(format!("waiting for confirmation ({})", attempt));
        }
        DeployEvent::Confirmed { block } => {
            spinner.finish();
            if let Some(block) = block {
                shell.note(format!("included in block {}", block));
            }
        }
    }
}

pub(crate) fn report_deployment(
    record: &DeploymentRecord,
    record_path: Option<&Path>,
    session: &Session,
) -> Result<()> {
    let shell = &session.shell;
    shell.status(
        Status::Deployed,
        format!("{} to {} (chain {})", record.contract, record.address, record.chain_id),
    );

    if let Some(path) = record_path {
        let path = session.ctx.cwd().join(path);
        record.save(&path).with_context(|| {
            format!("{} was deployed, but the record could not be saved", record.address)
        })?;
        shell.status(Status::Wrote, format!("deployment record to {}", path.display()));
    }

    shell.output(record.address);
    Ok(())
}
