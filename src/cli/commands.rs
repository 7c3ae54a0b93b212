use crate::context::PipelineContext;
use crate::coverage::capture::{Capturer, LcovCapturer, TracefileCapturer};
use crate::coverage::filter::{DEFAULT_EXCLUDES, ExclusionSet, filter_dataset};
use crate::coverage::lcov::read_tracefile;
use crate::coverage::summary::{render_summary, summarize};
use crate::diffcover::DEFAULT_COMPARE_BRANCH;
use crate::pipeline::{CoverageReporter, ReporterConfig, RunStatus, default_backends};
use crate::report::{ServiceInfo, to_coveralls};
use crate::types::models::CaptureMode;
use crate::upload::DEFAULT_COVERALLS_ENDPOINT;
use crate::utils::exec::SystemRunner;
use crate::utils::io::save_json;
use crate::utils::paths::artifacts_dir;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "covrelay",
    about = "Capture, filter and upload code coverage from a CI job",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture coverage in a directory and upload it to every configured service
    Run(RunArgs),

    /// Print a coverage summary for an existing tracefile
    Summary {
        /// LCOV tracefile to summarize
        tracefile: PathBuf,

        /// Additional path globs to exclude (system headers are always excluded)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Also write the summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Convert an existing tracefile into a Coveralls job document without uploading
    Convert {
        /// LCOV tracefile to convert
        tracefile: PathBuf,

        /// Where to write the JSON document
        #[arg(short, long, default_value = "coverage.c.json")]
        output: PathBuf,

        /// Directory source paths are made relative to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Additional path globs to exclude (system headers are always excluded)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory containing the instrumented build
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Directory for intermediate reports (defaults to <dir>/.covrelay)
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// How trace data is captured
    #[arg(long, value_enum, default_value_t = CaptureMode::Lcov)]
    pub capture: CaptureMode,

    /// Additional path globs to exclude (system headers are always excluded)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Also write the summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Codecov uploader executable
    #[arg(long, default_value = "codecov")]
    pub codecov_bin: String,

    /// Coveralls jobs API endpoint
    #[arg(long, env = "COVERALLS_ENDPOINT", default_value = DEFAULT_COVERALLS_ENDPOINT)]
    pub coveralls_endpoint: String,

    /// CI service name reported to Coveralls
    #[arg(long, env = "COVERALLS_SERVICE_NAME")]
    pub service_name: Option<String>,

    /// CI job id reported to Coveralls
    #[arg(long, env = "COVERALLS_SERVICE_JOB_ID")]
    pub service_job_id: Option<String>,

    /// Baseline branch for diff coverage
    #[arg(long, default_value = DEFAULT_COMPARE_BRANCH)]
    pub compare_branch: String,

    /// Do not try to install lcov when it is missing
    #[arg(long)]
    pub skip_install: bool,

    /// Remove intermediate reports when done
    #[arg(long)]
    pub clean: bool,
}

/// System header globs followed by any user-supplied ones
pub fn exclusion_patterns(extra: &[String]) -> Vec<String> {
    DEFAULT_EXCLUDES
        .iter()
        .map(|p| p.to_string())
        .chain(extra.iter().cloned())
        .collect()
}

fn absolute(dir: &Path) -> Result<PathBuf, std::io::Error> {
    dir.canonicalize().map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Cannot resolve directory '{}': {}", dir.display(), e),
        )
    })
}

pub fn execute_run_command(
    args: &RunArgs,
    context: &PipelineContext,
) -> Result<RunStatus, Box<dyn std::error::Error>> {
    let working_dir = absolute(&args.dir)?;
    let config = ReporterConfig {
        artifacts_dir: args
            .artifacts_dir
            .clone()
            .unwrap_or_else(|| artifacts_dir(&working_dir)),
        working_dir: working_dir.clone(),
        exclusions: exclusion_patterns(&args.exclude),
        summary_json: args.summary_json.clone(),
        service: ServiceInfo {
            service_name: args.service_name.clone(),
            service_job_id: args.service_job_id.clone(),
        },
        compare_branch: args.compare_branch.clone(),
        clean: args.clean,
    };

    let runner = SystemRunner::new(&working_dir);
    let capturer: Box<dyn Capturer + '_> = match args.capture {
        CaptureMode::Lcov => Box::new(LcovCapturer::new(
            &runner,
            context.platform(),
            !args.skip_install,
        )),
        CaptureMode::Tracefile => Box::new(TracefileCapturer),
    };
    let backends = default_backends(context, &runner, &args.codecov_bin, &args.coveralls_endpoint)?;

    info!(
        platform = %context.platform(),
        capture = %args.capture,
        diff_coverage = context.runs_diff_coverage(),
        "starting coverage relay"
    );

    let reporter = CoverageReporter::new(context, &config, &runner, capturer.as_ref(), backends);
    let report = reporter.run()?;

    for outcome in &report.uploads {
        match &outcome.result {
            Ok(()) => println!("Uploaded coverage to {}", outcome.backend),
            Err(e) => println!("Warning: {}", e),
        }
    }

    Ok(report.status())
}

pub fn execute_summary_command(
    tracefile: &Path,
    exclude: &[String],
    json: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = read_tracefile(tracefile)?;
    let filtered = filter_dataset(&dataset, &ExclusionSet::new(&exclusion_patterns(exclude)));
    let summary = summarize(&filtered);
    println!("{}", render_summary(&summary));

    if let Some(path) = json {
        save_json(&summary, path)?;
        println!("Summary saved to {}", path.display());
    }
    Ok(())
}

pub fn execute_convert_command(
    tracefile: &Path,
    output: &Path,
    dir: &Path,
    exclude: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = absolute(dir)?;
    let dataset = read_tracefile(tracefile)?;
    let filtered = filter_dataset(&dataset, &ExclusionSet::new(&exclusion_patterns(exclude)));
    let payload = to_coveralls(&filtered, &root, &ServiceInfo::default());
    save_json(&payload, output)?;

    println!(
        "Wrote {} source files to {}",
        payload.source_files.len(),
        output.display()
    );
    Ok(())
}
