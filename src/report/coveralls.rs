//! Conversion of a dataset into a Coveralls job document.
//!
//! See <https://docs.coveralls.io/api-reference>. Each source file carries a
//! `coverage` array indexed by line number minus one, with `null` for lines
//! that are not executable.

use crate::types::models::CoverageDataset;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverallsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_job_id: Option<String>,
    pub source_files: Vec<CoverallsSourceFile>,
}

impl CoverallsPayload {
    /// Copy of this payload authenticated with `token`
    pub fn with_token(&self, token: &str) -> Self {
        CoverallsPayload {
            repo_token: Some(token.to_string()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverallsSourceFile {
    pub name: String,
    pub coverage: Vec<Option<u64>>,
    /// Flattened `[line, block, branch, hits]` quadruples
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<u64>,
}

/// CI service fields attached to the job
#[derive(Debug, Clone, Default)]
pub struct ServiceInfo {
    pub service_name: Option<String>,
    pub service_job_id: Option<String>,
}

fn display_name(path: &str, root: &Path) -> String {
    Path::new(path)
        .strip_prefix(root)
        .map(|rel| rel.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Traced lines allowed past the end of a readable source file
const LINE_SLACK: usize = 64;

/// Highest line kept when the source cannot be read
const MAX_UNSOURCED_LINES: usize = 100_000;

fn source_line_count(path: &str, root: &Path) -> Option<usize> {
    match std::fs::read_to_string(root.join(path)) {
        Ok(source) => Some(source.lines().count()),
        Err(e) => {
            debug!(
                path,
                error = %e,
                "source not readable, sizing coverage from trace data"
            );
            None
        }
    }
}

/// Coverage array indexed by line - 1; lines past `bound` are dropped
fn coverage_array(
    path: &str,
    lines: &BTreeMap<u32, u64>,
    source_lines: Option<usize>,
) -> Vec<Option<u64>> {
    let bound = source_lines.map_or(MAX_UNSOURCED_LINES, |n| n + LINE_SLACK);
    let kept: Vec<(usize, u64)> = lines
        .iter()
        .map(|(line, hits)| (*line as usize, *hits))
        .filter(|(line, _)| {
            let in_range = *line > 0 && *line <= bound;
            if !in_range {
                debug!(path, line = *line, bound, "dropping line outside the source file");
            }
            in_range
        })
        .collect();

    let last_line = kept.last().map_or(0, |(line, _)| *line);
    let mut coverage = vec![None; source_lines.unwrap_or(0).max(last_line)];
    for (line, hits) in kept {
        coverage[line - 1] = Some(hits);
    }
    coverage
}

/// Build the Coveralls payload; an empty dataset gives an empty `source_files` list
pub fn to_coveralls(
    dataset: &CoverageDataset,
    root: &Path,
    service: &ServiceInfo,
) -> CoverallsPayload {
    let source_files = dataset
        .files
        .iter()
        .map(|(path, coverage)| {
            let lines = coverage_array(path, &coverage.lines, source_line_count(path, root));

            let branches = coverage
                .branches
                .iter()
                .flat_map(|(id, taken)| {
                    [
                        id.line as u64,
                        id.block as u64,
                        id.branch as u64,
                        taken.unwrap_or(0),
                    ]
                })
                .collect();

            CoverallsSourceFile {
                name: display_name(path, root),
                coverage: lines,
                branches,
            }
        })
        .collect();

    CoverallsPayload {
        repo_token: None,
        service_name: service.service_name.clone(),
        service_job_id: service.service_job_id.clone(),
        source_files,
    }
}
