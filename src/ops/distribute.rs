//! Implementation of `courier distribute`.
//!
//! The ABI is read from the build artifact once, rendered once, and written
//! to every consumer target. Each write is atomic (temp file + rename), so a
//! consumer sees either the previous file or the new one. Targets are
//! independent: every target is attempted, and if any write fails the run
//! fails with a per-target report. Re-running with the same artifact is safe
//! and produces byte-identical files.

use std::fmt;
use std::io;
use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;

use crate::core::artifact::ArtifactError;
use crate::core::workspace::{ResolvedTarget, Workspace};
use crate::core::BuildArtifact;
use crate::ops::pipeline::PipelineStep;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::write_atomic;
use crate::util::hash::sha256_str;

/// Error during distribution.
#[derive(Debug, Error)]
pub enum DistributeError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("failed to render interface description")]
    Render(#[source] serde_json::Error),

    #[error(
        "partial distribution: {} of {} targets failed",
        .0.failed.len(),
        .0.total()
    )]
    Partial(PartialDistribution),
}

impl DistributeError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DistributeError::Artifact(e) => e.to_diagnostic(),
            DistributeError::Render(e) => {
                Diagnostic::error(self.to_string()).with_context(e.to_string())
            }
            DistributeError::Partial(partial) => {
                let mut diag = Diagnostic::error(self.to_string());
                for report in &partial.succeeded {
                    diag = diag.with_context(format!("ok     {}", report.target.target));
                }
                for failure in &partial.failed {
                    diag = diag.with_context(format!(
                        "FAILED {}: {}",
                        failure.target.target, failure.error
                    ));
                }
                diag.with_suggestion(suggestions::RERUN_DISTRIBUTE)
            }
        }
    }
}

/// How a target's content changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The file did not exist
    Created,
    /// The file held a different ABI
    Updated,
    /// The file already held this ABI; it was rewritten anyway
    Unchanged,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStatus::Created => write!(f, "created"),
            WriteStatus::Updated => write!(f, "updated"),
            WriteStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A successful target write.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: ResolvedTarget,
    pub status: WriteStatus,
}

/// A failed target write.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: ResolvedTarget,
    pub error: io::Error,
}

/// Per-target outcome of a run in which at least one write failed.
#[derive(Debug)]
pub struct PartialDistribution {
    pub succeeded: Vec<TargetReport>,
    pub failed: Vec<TargetFailure>,
}

impl PartialDistribution {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct DistributionReport {
    pub contract: String,
    pub artifact_path: PathBuf,
    /// SHA-256 of the rendered ABI
    pub fingerprint: String,
    /// One entry per target, in manifest order
    pub targets: Vec<TargetReport>,
}

impl DistributionReport {
    /// Number of targets whose content changed.
    pub fn changed(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.status != WriteStatus::Unchanged)
            .count()
    }
}

/// State of a target in `--check` mode.
#[derive(Debug)]
pub enum CheckStatus {
    UpToDate,
    Stale,
    Missing,
    /// The target exists but could not be read (a directory, no permission)
    Unreadable(io::Error),
}

impl CheckStatus {
    fn of(target: &ResolvedTarget, rendered: &str) -> Self {
        match std::fs::read(&target.path) {
            Ok(existing) if existing == rendered.as_bytes() => CheckStatus::UpToDate,
            Ok(_) => CheckStatus::Stale,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CheckStatus::Missing,
            Err(e) => CheckStatus::Unreadable(e),
        }
    }

    pub fn is_up_to_date(&self) -> bool {
        matches!(self, CheckStatus::UpToDate)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::UpToDate => write!(f, "up to date"),
            CheckStatus::Stale => write!(f, "stale"),
            CheckStatus::Missing => write!(f, "missing"),
            CheckStatus::Unreadable(e) => write!(f, "unreadable: {}", e),
        }
    }
}

/// Outcome of `--check`.
#[derive(Debug)]
pub struct CheckReport {
    pub fingerprint: String,
    pub targets: Vec<(ResolvedTarget, CheckStatus)>,
}

impl CheckReport {
    /// Whether every target already matches the artifact.
    pub fn is_clean(&self) -> bool {
        self.targets.iter().all(|(_, status)| status.is_up_to_date())
    }

    /// Targets that would change on the next run, or could not be read.
    pub fn outdated(&self) -> impl Iterator<Item = &(ResolvedTarget, CheckStatus)> {
        self.targets
            .iter()
            .filter(|(_, status)| !status.is_up_to_date())
    }
}

/// Render the ABI the way every consumer file stores it: two-space indented
/// JSON with the artifact's key order and no trailing newline.
pub fn render_interface(abi: &serde_json::Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(abi)
}

/// Copies one contract's ABI to every consumer target.
#[derive(Debug, Clone)]
pub struct Distributor {
    contract: String,
    artifact_path: PathBuf,
    targets: Vec<ResolvedTarget>,
    parallel: bool,
}

impl Distributor {
    /// Create a distributor for a contract artifact and a set of targets.
    pub fn new(
        contract: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
        targets: Vec<ResolvedTarget>,
    ) -> Self {
        Distributor {
            contract: contract.into(),
            artifact_path: artifact_path.into(),
            targets,
            parallel: true,
        }
    }

    /// Distributor for the workspace's contract and configured targets.
    pub fn for_workspace(ws: &Workspace) -> Self {
        Self::new(ws.contract_name(), ws.artifact_path(), ws.targets())
    }

    /// Write targets one after another instead of in parallel.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Configured targets.
    pub fn targets(&self) -> &[ResolvedTarget] {
        &self.targets
    }

    fn load(&self) -> Result<(BuildArtifact, String), DistributeError> {
        let artifact = BuildArtifact::load(&self.artifact_path, &self.contract)?;
        let rendered = render_interface(artifact.abi_json()).map_err(DistributeError::Render)?;
        Ok((artifact, rendered))
    }

    /// Write the ABI to every target.
    ///
    /// Nothing is written when the artifact is missing or malformed.
    pub fn distribute(&self) -> Result<DistributionReport, DistributeError> {
        let (artifact, rendered) = self.load()?;
        let fingerprint = sha256_str(&rendered);

        tracing::info!(
            "distributing {} ABI ({} bytes, sha256 {}) to {} targets",
            self.contract,
            rendered.len(),
            &fingerprint[..12],
            self.targets.len()
        );

        let write = |target: &ResolvedTarget| (target.clone(), write_target(target, &rendered));
        let outcomes: Vec<(ResolvedTarget, io::Result<WriteStatus>)> = if self.parallel {
            self.targets.par_iter().map(write).collect()
        } else {
            self.targets.iter().map(write).collect()
        };

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (target, outcome) in outcomes {
            match outcome {
                Ok(status) => {
                    tracing::debug!("{}: {}", target.path.display(), status);
                    succeeded.push(TargetReport { target, status });
                }
                Err(error) => {
                    tracing::debug!("{}: {}", target.path.display(), error);
                    failed.push(TargetFailure { target, error });
                }
            }
        }

        if !failed.is_empty() {
            return Err(DistributeError::Partial(PartialDistribution { succeeded, failed }));
        }

        Ok(DistributionReport {
            contract: self.contract.clone(),
            artifact_path: artifact.path().to_path_buf(),
            fingerprint,
            targets: succeeded,
        })
    }

    /// Compare every target with the artifact without writing anything.
    pub fn check(&self) -> Result<CheckReport, DistributeError> {
        let (_, rendered) = self.load()?;

        let targets = self
            .targets
            .iter()
            .map(|target| (target.clone(), CheckStatus::of(target, &rendered)))
            .collect();

        Ok(CheckReport {
            fingerprint: sha256_str(&rendered),
            targets,
        })
    }
}

fn write_target(target: &ResolvedTarget, rendered: &str) -> io::Result<WriteStatus> {
    let status = match std::fs::read(&target.path) {
        Ok(existing) if existing == rendered.as_bytes() => WriteStatus::Unchanged,
        Ok(_) => WriteStatus::Updated,
        Err(_) => WriteStatus::Created,
    };

    write_atomic(&target.path, rendered.as_bytes())?;
    Ok(status)
}

impl PipelineStep for Distributor {
    type Input = ();
    type Output = DistributionReport;
    type Error = DistributeError;

    fn name(&self) -> &'static str {
        "distribute"
    }

    fn run(&self, _: ()) -> Result<DistributionReport, DistributeError> {
        self.distribute()
    }
}
