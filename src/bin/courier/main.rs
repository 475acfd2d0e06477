//! Courier CLI - deploy a smart contract and ship its ABI to every consumer

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Session;
use courier::core::{ArtifactError, ManifestError};
use courier::ops::{DeployError, DistributeError, PipelineError};
use courier::util::diagnostic::{self, Diagnostic};
use courier::util::{GlobalContext, Shell};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli, &shell) {
        match to_diagnostic(&e) {
            Some(diag) => diagnostic::emit(&diag, shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("courier=debug")
    } else if cli.quiet {
        EnvFilter::new("courier=error")
    } else {
        EnvFilter::new("courier=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let session = Session::new(GlobalContext::new()?, shell.clone(), cli.manifest_path);

    // Execute command
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &session),
        Commands::Deploy(args) => commands::deploy::execute(args, &session),
        Commands::Distribute(args) => commands::distribute::execute(args, &session),
        Commands::Release(args) => commands::release::execute(args, &session),
        Commands::Artifact => commands::artifact::execute(&session),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render known library errors as diagnostics with suggestions.
fn to_diagnostic(e: &anyhow::Error) -> Option<Diagnostic> {
    e.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<PipelineError>() {
            let inner = known_diagnostic(err.source.as_ref())?;
            return Some(inner.with_context(format!("the `{}` step failed", err.step)));
        }
        known_diagnostic(cause)
    })
}

fn known_diagnostic(e: &(dyn std::error::Error + 'static)) -> Option<Diagnostic> {
    if let Some(err) = e.downcast_ref::<DistributeError>() {
        return Some(err.to_diagnostic());
    }
    if let Some(err) = e.downcast_ref::<DeployError>() {
        return Some(err.to_diagnostic());
    }
    if let Some(err) = e.downcast_ref::<ArtifactError>() {
        return Some(err.to_diagnostic());
    }
    if let Some(err) = e.downcast_ref::<ManifestError>() {
        return Some(err.to_diagnostic());
    }
    None
}
