//! `courier release` command

use anyhow::Result;

use crate::cli::DeployArgs;
use crate::commands::{deploy, distribute, Session};
use courier::ops::{release, DeployRequest, Distributor};
use courier::util::Status;

pub fn execute(args: DeployArgs, session: &Session) -> Result<()> {
    let ws = session.workspace()?;
    let artifact = ws.load_artifact()?;

    let distributor = Distributor::for_workspace(&ws);
    let (deployer, spinner) = deploy::connect(&args.network, &ws, session)?;
    let request = DeployRequest::new(artifact).with_args(args.args);

    let span = session
        .shell
        .span(Status::Deploying, format!("{} and distributing its ABI", ws.contract_name()));
    let (record, report) = release(deployer, distributor, request)?;
    spinner.finish();

    deploy::report_deployment(&record, args.record.as_deref(), session)?;
    distribute::print_report(&ws, &report, &session.shell);

    span.finish_with_message(format!("released {}", record.contract));
    Ok(())
}
