//! Secondary pass reporting coverage of the lines changed against a baseline branch.

use crate::types::errors::Error;
use crate::utils::exec::{CommandRunner, run_checked};
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_COMPARE_BRANCH: &str = "origin/main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffCoverageOutcome {
    Skipped,
    Succeeded,
    Failed(String),
}

pub struct DiffCoverage<'a> {
    runner: &'a dyn CommandRunner,
    compare_branch: String,
}

impl<'a> DiffCoverage<'a> {
    pub fn new(runner: &'a dyn CommandRunner, compare_branch: &str) -> Self {
        DiffCoverage {
            runner,
            compare_branch: compare_branch.to_string(),
        }
    }

    pub fn install(&self) -> Result<(), Error> {
        run_checked(self.runner, "pip", &["install", "diff_cover"])?;
        Ok(())
    }

    /// Run diff-cover over `report` and echo its report to stdout
    pub fn analyze(&self, report: &Path) -> Result<(), Error> {
        let report = report.to_string_lossy().into_owned();
        let compare = format!("--compare-branch={}", self.compare_branch);
        let output = run_checked(
            self.runner,
            "diff-cover",
            &[report.as_str(), compare.as_str()],
        )?;
        print!("{}", output.stdout);
        Ok(())
    }

    /// Install then analyze, folding any failure into the outcome
    pub fn run(&self, report: &Path) -> DiffCoverageOutcome {
        info!(compare_branch = %self.compare_branch, "running diff coverage");
        match self.install().and_then(|_| self.analyze(report)) {
            Ok(()) => DiffCoverageOutcome::Succeeded,
            Err(e) => {
                warn!(error = %e, "diff coverage failed");
                DiffCoverageOutcome::Failed(e.to_string())
            }
        }
    }
}
