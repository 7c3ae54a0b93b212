use crate::utils::paths::intermediate_files;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Determines if a directory is empty or only contains empty directories
fn is_effectively_empty(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    for entry in WalkDir::new(path).min_depth(1) {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => continue,
            // A file, or an unreadable entry: keep the directory
            _ => return false,
        }
    }

    true
}

/// Remove the pipeline's intermediate files, then the artifacts directory
/// if nothing else is left in it
pub fn cleanup_artifacts(artifacts_dir: &Path) {
    for file in intermediate_files(artifacts_dir) {
        if !file.exists() {
            continue;
        }
        match fs::remove_file(&file) {
            Ok(_) => debug!(file = %file.display(), "removed intermediate file"),
            Err(e) => warn!(file = %file.display(), error = %e, "failed to clean up"),
        }
    }

    if is_effectively_empty(artifacts_dir) {
        if let Err(e) = fs::remove_dir_all(artifacts_dir) {
            warn!(
                dir = %artifacts_dir.display(),
                error = %e,
                "failed to remove artifacts directory"
            );
        }
    }
}
