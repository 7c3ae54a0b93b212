use crate::types::models::CoverageDataset;
use tracing::info;
use wildmatch::WildMatch;

/// System headers are never part of the project's coverage
pub const DEFAULT_EXCLUDES: &[&str] = &["/usr/*"];

/// Set of path globs whose files are dropped from a dataset
pub struct ExclusionSet {
    patterns: Vec<(String, WildMatch)>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        ExclusionSet {
            patterns: patterns
                .iter()
                .map(|p| (p.as_ref().to_string(), WildMatch::new(p.as_ref())))
                .collect(),
        }
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(raw, _)| raw.as_str())
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|(_, glob)| glob.matches(path))
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDES)
    }
}

/// Return a copy of `dataset` without the excluded files. The input is left untouched.
pub fn filter_dataset(dataset: &CoverageDataset, exclusions: &ExclusionSet) -> CoverageDataset {
    let files: std::collections::BTreeMap<_, _> = dataset
        .files
        .iter()
        .filter(|(path, _)| !exclusions.is_excluded(path))
        .map(|(path, coverage)| (path.clone(), coverage.clone()))
        .collect();

    let removed = dataset.files.len() - files.len();
    if removed > 0 {
        info!(
            removed,
            kept = files.len(),
            patterns = ?exclusions.patterns().collect::<Vec<_>>(),
            "excluded files from coverage"
        );
    }

    CoverageDataset { files }
}
