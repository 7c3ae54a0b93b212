use crate::coverage::lcov::{read_tracefile, save_tracefile};
use crate::platform::{Platform, ensure_tool};
use crate::types::errors::Error;
use crate::types::models::CoverageDataset;
use crate::utils::exec::CommandRunner;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Turns the trace data under a directory into a dataset.
///
/// Implementations also write the raw dataset to `output` as a tracefile.
pub trait Capturer {
    fn name(&self) -> &'static str;

    fn capture(&self, root: &Path, output: &Path) -> Result<CoverageDataset, Error>;
}

/// Recursively collect files with the given extension, skipping `skip` and VCS metadata
///
/// `skip` may be relative or non-canonical; it is matched after resolving both sides.
pub fn find_trace_files(root: &Path, extension: &str, skip: Option<&Path>) -> Vec<PathBuf> {
    let skip = skip.and_then(|dir| dir.canonicalize().ok());
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() > 0 && entry.file_type().is_dir() {
                if entry.file_name() == ".git" {
                    return false;
                }
                if let Some(skip) = &skip {
                    return entry.path().canonicalize().ok().as_ref() != Some(skip);
                }
            }
            true
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == extension))
        .map(|entry| entry.into_path())
        .collect();

    found.sort();
    found
}

/// Delegates capture to the `lcov` binary over `.gcda` files
pub struct LcovCapturer<'a> {
    runner: &'a dyn CommandRunner,
    platform: Platform,
    install: bool,
}

impl<'a> LcovCapturer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, platform: Platform, install: bool) -> Self {
        LcovCapturer {
            runner,
            platform,
            install,
        }
    }
}

impl Capturer for LcovCapturer<'_> {
    fn name(&self) -> &'static str {
        "lcov"
    }

    fn capture(&self, root: &Path, output: &Path) -> Result<CoverageDataset, Error> {
        if self.install {
            if let Err(e) = ensure_tool(self.runner, self.platform, "lcov", "lcov") {
                warn!(error = %e, "could not install lcov, trying to capture anyway");
            }
        }

        let traces = find_trace_files(root, "gcda", output.parent());
        if traces.is_empty() {
            return Err(Error::NoTraceData(root.display().to_string()));
        }
        info!(count = traces.len(), "found .gcda trace files");

        let root_str = root.to_string_lossy().into_owned();
        let output_str = output.to_string_lossy().into_owned();
        let result = self.runner.run(
            "lcov",
            &[
                "--capture",
                "--directory",
                root_str.as_str(),
                "-b",
                root_str.as_str(),
                "--output-file",
                output_str.as_str(),
            ],
        )?;

        if !result.success {
            return Err(Error::CaptureFailed(format!(
                "lcov exited with {}\nStderr: {}",
                result.status,
                result.stderr.trim()
            )));
        }

        read_tracefile(output)
    }
}

/// Merges `*.info` tracefiles already present under the tree
pub struct TracefileCapturer;

impl Capturer for TracefileCapturer {
    fn name(&self) -> &'static str {
        "tracefile"
    }

    fn capture(&self, root: &Path, output: &Path) -> Result<CoverageDataset, Error> {
        let traces = find_trace_files(root, "info", output.parent());
        if traces.is_empty() {
            return Err(Error::NoTraceData(root.display().to_string()));
        }

        let mut dataset = CoverageDataset::default();
        for path in &traces {
            info!(tracefile = %path.display(), "merging tracefile");
            dataset.merge(&read_tracefile(path)?);
        }

        save_tracefile(&dataset, output)?;
        Ok(dataset)
    }
}
