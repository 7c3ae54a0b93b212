//! The coverage relay: capture, filter, convert, summarize, upload, and
//! optionally diff coverage, strictly in that order.

use crate::context::{CODECOV_TOKEN_VAR, COVERALLS_TOKEN_VAR, PipelineContext};
use crate::coverage::capture::Capturer;
use crate::coverage::filter::{ExclusionSet, filter_dataset};
use crate::coverage::lcov::save_tracefile;
use crate::coverage::summary::{render_summary, summarize};
use crate::diffcover::{DiffCoverage, DiffCoverageOutcome};
use crate::report::{ServiceInfo, to_coveralls};
use crate::types::errors::Error;
use crate::types::models::{CoverageDataset, CoverageSummary};
use crate::upload::{Backend, CodecovCli, CoverallsHttp, ReportArtifacts, UploadOutcome, upload_all};
use crate::utils::cleanup::cleanup_artifacts;
use crate::utils::exec::CommandRunner;
use crate::utils::io::save_json;
use crate::utils::paths::{coveralls_payload_path, filtered_tracefile_path, raw_tracefile_path};
use std::path::PathBuf;
use tracing::{info, warn};

/// Exit status for errors that stop the pipeline
pub const FATAL_EXIT_CODE: u8 = 1;

/// Options that do not come from the CI environment
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub working_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub exclusions: Vec<String>,
    pub summary_json: Option<PathBuf>,
    pub service: ServiceInfo,
    pub compare_branch: String,
    pub clean: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    UploadFailed,
    DiffCoverageFailed,
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::UploadFailed => 2,
            RunStatus::DiffCoverageFailed => 3,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub summary: CoverageSummary,
    /// The summary exactly as printed
    pub summary_text: String,
    pub uploads: Vec<UploadOutcome>,
    pub diff_coverage: DiffCoverageOutcome,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.uploads.iter().any(|outcome| !outcome.succeeded()) {
            RunStatus::UploadFailed
        } else if matches!(self.diff_coverage, DiffCoverageOutcome::Failed(_)) {
            RunStatus::DiffCoverageFailed
        } else {
            RunStatus::Success
        }
    }
}

/// The Coveralls and Codecov targets, with tokens taken from the context
pub fn default_backends<'a>(
    context: &PipelineContext,
    runner: &'a dyn CommandRunner,
    codecov_program: &str,
    coveralls_endpoint: &str,
) -> Result<Vec<Backend<'a>>, Error> {
    Ok(vec![
        Backend {
            name: "coveralls",
            token_var: COVERALLS_TOKEN_VAR,
            token: context.coveralls_token.clone(),
            client: Box::new(CoverallsHttp::new(coveralls_endpoint)?),
        },
        Backend {
            name: "codecov",
            token_var: CODECOV_TOKEN_VAR,
            token: context.codecov_token.clone(),
            client: Box::new(CodecovCli::new(runner, codecov_program)),
        },
    ])
}

pub struct CoverageReporter<'a> {
    context: &'a PipelineContext,
    config: &'a ReporterConfig,
    runner: &'a dyn CommandRunner,
    capturer: &'a dyn Capturer,
    backends: Vec<Backend<'a>>,
}

impl<'a> CoverageReporter<'a> {
    pub fn new(
        context: &'a PipelineContext,
        config: &'a ReporterConfig,
        runner: &'a dyn CommandRunner,
        capturer: &'a dyn Capturer,
        backends: Vec<Backend<'a>>,
    ) -> Self {
        CoverageReporter {
            context,
            config,
            runner,
            capturer,
            backends,
        }
    }

    /// Run the whole relay. `Err` means nothing was reported.
    pub fn run(&self) -> Result<RunReport, Error> {
        let artifacts_dir = &self.config.artifacts_dir;
        std::fs::create_dir_all(artifacts_dir)?;

        info!(
            capturer = self.capturer.name(),
            dir = %self.config.working_dir.display(),
            "capturing coverage"
        );
        let raw = self
            .capturer
            .capture(&self.config.working_dir, &raw_tracefile_path(artifacts_dir))?;

        let filtered = filter_dataset(&raw, &ExclusionSet::new(&self.config.exclusions));
        let filtered_path = filtered_tracefile_path(artifacts_dir);
        save_tracefile(&filtered, &filtered_path)?;

        let payload = to_coveralls(&filtered, &self.config.working_dir, &self.config.service);
        save_json(&payload, &coveralls_payload_path(artifacts_dir))?;

        let (summary, summary_text) = self.summarize(&filtered);

        let artifacts = ReportArtifacts {
            filtered_tracefile: &filtered_path,
            coveralls: &payload,
        };
        let uploads = upload_all(&self.backends, &artifacts);

        let diff_coverage = if self.context.runs_diff_coverage() {
            DiffCoverage::new(self.runner, &self.config.compare_branch).run(&filtered_path)
        } else {
            DiffCoverageOutcome::Skipped
        };

        if self.config.clean {
            cleanup_artifacts(artifacts_dir);
        }

        Ok(RunReport {
            summary,
            summary_text,
            uploads,
            diff_coverage,
        })
    }

    fn summarize(&self, dataset: &CoverageDataset) -> (CoverageSummary, String) {
        let summary = summarize(dataset);
        let text = render_summary(&summary);
        println!("{}", text);

        if let Some(path) = &self.config.summary_json {
            if let Err(e) = save_json(&summary, path) {
                warn!(path = %path.display(), error = %e, "failed to write summary JSON");
            }
        }

        (summary, text)
    }
}
