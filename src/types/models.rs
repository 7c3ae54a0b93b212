use serde::Serialize;
use std::collections::BTreeMap;

/// Coverage of a single source file, as recorded in an LCOV tracefile
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileCoverage {
    /// Execution count per line number
    pub lines: BTreeMap<u32, u64>,
    /// Function name -> (first line, execution count)
    pub functions: BTreeMap<String, FunctionHit>,
    /// Taken count per (line, block, branch); `None` means the block never ran
    pub branches: BTreeMap<BranchId, Option<u64>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FunctionHit {
    pub line: u32,
    pub hits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchId {
    pub line: u32,
    pub block: u32,
    pub branch: u32,
}

impl FileCoverage {
    pub fn lines_found(&self) -> usize {
        self.lines.len()
    }

    pub fn lines_hit(&self) -> usize {
        self.lines.values().filter(|&&hits| hits > 0).count()
    }

    pub fn functions_found(&self) -> usize {
        self.functions.len()
    }

    pub fn functions_hit(&self) -> usize {
        self.functions.values().filter(|f| f.hits > 0).count()
    }

    pub fn branches_found(&self) -> usize {
        self.branches.len()
    }

    pub fn branches_hit(&self) -> usize {
        self.branches
            .values()
            .filter(|taken| matches!(taken, Some(n) if *n > 0))
            .count()
    }

    /// Fold another record for the same file into this one, summing counts
    pub fn merge(&mut self, other: &FileCoverage) {
        for (line, hits) in &other.lines {
            let count = self.lines.entry(*line).or_default();
            *count = count.saturating_add(*hits);
        }
        for (name, hit) in &other.functions {
            let entry = self.functions.entry(name.clone()).or_insert(FunctionHit {
                line: hit.line,
                hits: 0,
            });
            entry.hits = entry.hits.saturating_add(hit.hits);
        }
        for (id, taken) in &other.branches {
            let entry = self.branches.entry(*id).or_insert(None);
            *entry = merge_taken(*entry, *taken);
        }
    }
}

/// Sum two branch counts, where `None` ("block never ran") only survives if both are `None`
pub fn merge_taken(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}

/// Line/function/branch execution counts for a directory tree, keyed by source path
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoverageDataset {
    pub files: BTreeMap<String, FileCoverage>,
}

impl CoverageDataset {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Merge a file record into the dataset
    pub fn add_file(&mut self, path: &str, coverage: &FileCoverage) {
        match self.files.get_mut(path) {
            Some(existing) => existing.merge(coverage),
            None => {
                self.files.insert(path.to_string(), coverage.clone());
            }
        }
    }

    /// Merge every file of another dataset into this one
    pub fn merge(&mut self, other: &CoverageDataset) {
        for (path, coverage) in &other.files {
            self.add_file(path, coverage);
        }
    }
}

/// Summary of one file's coverage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub lines_found: usize,
    pub lines_hit: usize,
    pub line_percent: f64,
    pub functions_found: usize,
    pub functions_hit: usize,
    pub branches_found: usize,
    pub branches_hit: usize,
}

/// Human-oriented summary of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub files: Vec<FileSummary>,
    pub lines_found: usize,
    pub lines_hit: usize,
    pub line_percent: f64,
    pub functions_found: usize,
    pub functions_hit: usize,
    pub branches_found: usize,
    pub branches_hit: usize,
}

/// How raw trace data is turned into a dataset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CaptureMode {
    /// Run `lcov --capture` over the `.gcda` files in the tree
    #[default]
    Lcov,
    /// Merge existing `*.info` tracefiles found in the tree
    Tracefile,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Lcov => write!(f, "lcov"),
            CaptureMode::Tracefile => write!(f, "tracefile"),
        }
    }
}
