//! `courier distribute` command

use anyhow::{bail, Result};

use crate::cli::DistributeArgs;
use crate::commands::Session;
use courier::core::Workspace;
use courier::ops::{CheckStatus, DistributionReport, Distributor, WriteStatus};
use courier::util::{Shell, Status};

pub fn execute(args: DistributeArgs, session: &Session) -> Result<()> {
    let ws = session.workspace()?;

    let mut distributor = Distributor::for_workspace(&ws);
    if args.sequential {
        distributor = distributor.sequential();
    }

    if args.check {
        return check(&ws, &distributor, &session.shell);
    }

    let span = session.shell.span(
        Status::Distributing,
        format!(
            "{} ABI to {} target(s)",
            ws.contract_name(),
            distributor.targets().len()
        ),
    );

    let report = distributor.distribute()?;
    print_report(&ws, &report, &session.shell);

    span.finish_with_message(format!(
        "{} ABI is in sync ({} changed)",
        report.contract,
        report.changed()
    ));
    Ok(())
}

pub(crate) fn print_report(ws: &Workspace, report: &DistributionReport, shell: &Shell) {
    for target in &report.targets {
        let status = match target.status {
            WriteStatus::Unchanged => Status::Unchanged,
            WriteStatus::Created | WriteStatus::Updated => Status::Wrote,
        };
        shell.status(
            status,
            format!(
                "{} ({}, {})",
                ws.display_path(&target.target.path),
                target.target.target.role,
                target.status
            ),
        );
    }
    shell.note(format!("sha256 {}", report.fingerprint));
}

fn check(ws: &Workspace, distributor: &Distributor, shell: &Shell) -> Result<()> {
    shell.status(
        Status::Checking,
        format!("{} ABI in {} target(s)", ws.contract_name(), distributor.targets().len()),
    );

    let report = distributor.check()?;
    for (target, status) in &report.targets {
        let line = format!("{} ({})", ws.display_path(&target.path), status);
        match status {
            CheckStatus::UpToDate => shell.status(Status::Unchanged, line),
            CheckStatus::Stale | CheckStatus::Missing => shell.status(Status::Stale, line),
            CheckStatus::Unreadable(_) => shell.status(Status::Error, line),
        }
    }
    shell.note(format!("sha256 {}", report.fingerprint));

    let outdated = report.outdated().count();
    if outdated > 0 {
        bail!(
            "{} of {} target(s) out of date; run `courier distribute`",
            outdated,
            report.targets.len()
        );
    }

    shell.status(Status::Finished, "every target is up to date");
    Ok(())
}
