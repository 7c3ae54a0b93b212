use std::path::{Path, PathBuf};

/// Name of the directory, inside the working directory, holding intermediate reports
pub const ARTIFACTS_DIR_NAME: &str = ".covrelay";

pub const RAW_TRACEFILE: &str = "coverage.info";
pub const FILTERED_TRACEFILE: &str = "coverage.filtered.info";
pub const COVERALLS_PAYLOAD: &str = "coverage.c.json";

/// Default artifacts directory for a working directory
pub fn artifacts_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(ARTIFACTS_DIR_NAME)
}

/// Tracefile holding the dataset exactly as captured
pub fn raw_tracefile_path(artifacts_dir: &Path) -> PathBuf {
    artifacts_dir.join(RAW_TRACEFILE)
}

/// Tracefile holding the dataset after exclusions
pub fn filtered_tracefile_path(artifacts_dir: &Path) -> PathBuf {
    artifacts_dir.join(FILTERED_TRACEFILE)
}

/// Coveralls job document, as written before upload (without token)
pub fn coveralls_payload_path(artifacts_dir: &Path) -> PathBuf {
    artifacts_dir.join(COVERALLS_PAYLOAD)
}

/// Every intermediate file the pipeline may write
pub fn intermediate_files(artifacts_dir: &Path) -> Vec<PathBuf> {
    vec![
        raw_tracefile_path(artifacts_dir),
        filtered_tracefile_path(artifacts_dir),
        coveralls_payload_path(artifacts_dir),
    ]
}
