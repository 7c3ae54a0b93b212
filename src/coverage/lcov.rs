//! Reader and writer for the LCOV tracefile format.
//!
//! Only the records that carry counts are kept (`SF`, `FN`, `FNDA`, `BRDA`,
//! `DA`); summary records (`LF`, `LH`, `FNF`, ...) are recomputed on write.
//! Malformed lines are skipped so a damaged tracefile still yields whatever
//! it does describe.

use crate::types::errors::Error;
use crate::types::models::{BranchId, CoverageDataset, FileCoverage, FunctionHit, merge_taken};
use std::path::Path;
use tracing::debug;

/// Parse tracefile text into a dataset. Records for the same file are merged.
pub fn parse_tracefile(content: &str) -> CoverageDataset {
    let mut dataset = CoverageDataset::default();
    let mut current: Option<(String, FileCoverage)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some((path, coverage)) = current.take() {
                dataset.add_file(&path, &coverage);
            }
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            debug!(line = index + 1, "skipping malformed tracefile line");
            continue;
        };

        if tag == "SF" {
            if let Some((path, coverage)) = current.take() {
                dataset.add_file(&path, &coverage);
            }
            current = Some((value.to_string(), FileCoverage::default()));
            continue;
        }

        let Some((_, coverage)) = current.as_mut() else {
            continue;
        };

        let parsed = match tag {
            "DA" => parse_line_record(value, coverage),
            "FN" => parse_function_record(value, coverage),
            "FNDA" => parse_function_hits(value, coverage),
            "BRDA" => parse_branch_record(value, coverage),
            _ => Some(()),
        };

        if parsed.is_none() {
            debug!(line = index + 1, tag, "skipping malformed tracefile record");
        }
    }

    if let Some((path, coverage)) = current.take() {
        dataset.add_file(&path, &coverage);
    }

    dataset
}

fn parse_count(value: &str) -> Option<u64> {
    // gcov can report negative counts on overflow; treat those as unexecuted
    match value.trim().parse::<i64>() {
        Ok(n) => Some(n.max(0) as u64),
        Err(_) => value.trim().parse::<u64>().ok(),
    }
}

fn parse_line_record(value: &str, coverage: &mut FileCoverage) -> Option<()> {
    let mut parts = value.split(',');
    let line: u32 = parts.next()?.trim().parse().ok()?;
    let hits = parse_count(parts.next()?)?;
    let count = coverage.lines.entry(line).or_default();
    *count = count.saturating_add(hits);
    Some(())
}

// FN:<line>,<name> or FN:<line>,<end line>,<name>
fn parse_function_record(value: &str, coverage: &mut FileCoverage) -> Option<()> {
    let (line, rest) = value.split_once(',')?;
    let line: u32 = line.trim().parse().ok()?;
    let name = match rest.split_once(',') {
        Some((end, name)) if end.trim().parse::<u32>().is_ok() => name,
        _ => rest,
    };
    coverage
        .functions
        .entry(name.to_string())
        .or_insert(FunctionHit { line, hits: 0 })
        .line = line;
    Some(())
}

fn parse_function_hits(value: &str, coverage: &mut FileCoverage) -> Option<()> {
    let (hits, name) = value.split_once(',')?;
    let hits = parse_count(hits)?;
    let function = coverage.functions.entry(name.to_string()).or_default();
    function.hits = function.hits.saturating_add(hits);
    Some(())
}

fn parse_branch_record(value: &str, coverage: &mut FileCoverage) -> Option<()> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() < 4 {
        return None;
    }
    let id = BranchId {
        line: parts[0].parse().ok()?,
        block: parts[1].parse().ok()?,
        // newer lcov versions allow an expression in place of the branch number
        branch: parts[2].parse().unwrap_or(0),
    };
    let taken = match parts[3] {
        "-" => None,
        count => Some(parse_count(count)?),
    };
    let entry = coverage.branches.entry(id).or_insert(None);
    *entry = merge_taken(*entry, taken);
    Some(())
}

/// Render a dataset as tracefile text
pub fn write_tracefile(dataset: &CoverageDataset) -> String {
    let mut records: Vec<String> = Vec::new();

    for (path, coverage) in &dataset.files {
        records.push("TN:".to_string());
        records.push(format!("SF:{}", path));

        let mut functions: Vec<_> = coverage.functions.iter().collect();
        functions.sort_by(|a, b| (a.1.line, a.0).cmp(&(b.1.line, b.0)));
        records.extend(
            functions
                .iter()
                .map(|(name, hit)| format!("FN:{},{}", hit.line, name)),
        );
        records.extend(
            functions
                .iter()
                .map(|(name, hit)| format!("FNDA:{},{}", hit.hits, name)),
        );
        records.push(format!("FNF:{}", coverage.functions_found()));
        records.push(format!("FNH:{}", coverage.functions_hit()));

        records.extend(coverage.branches.iter().map(|(id, taken)| {
            let taken = taken.map_or_else(|| "-".to_string(), |n| n.to_string());
            format!("BRDA:{},{},{},{}", id.line, id.block, id.branch, taken)
        }));
        records.push(format!("BRF:{}", coverage.branches_found()));
        records.push(format!("BRH:{}", coverage.branches_hit()));

        records.extend(
            coverage
                .lines
                .iter()
                .map(|(line, hits)| format!("DA:{},{}", line, hits)),
        );
        records.push(format!("LF:{}", coverage.lines_found()));
        records.push(format!("LH:{}", coverage.lines_hit()));
        records.push("end_of_record".to_string());
    }

    records.into_iter().map(|record| record + "\n").collect()
}

pub fn read_tracefile(path: &Path) -> Result<CoverageDataset, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read tracefile '{}': {}", path.display(), e),
        ))
    })?;
    Ok(parse_tracefile(&content))
}

pub fn save_tracefile(dataset: &CoverageDataset, path: &Path) -> Result<(), Error> {
    std::fs::write(path, write_tracefile(dataset))?;
    Ok(())
}
