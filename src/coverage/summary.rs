use crate::types::models::{CoverageDataset, CoverageSummary, FileSummary};

fn percent(hit: usize, found: usize) -> f64 {
    if found > 0 {
        (hit as f64 / found as f64) * 100.0
    } else {
        0.0
    }
}

/// Per-file and overall counts for a dataset
pub fn summarize(dataset: &CoverageDataset) -> CoverageSummary {
    let files: Vec<FileSummary> = dataset
        .files
        .iter()
        .map(|(path, coverage)| FileSummary {
            path: path.clone(),
            lines_found: coverage.lines_found(),
            lines_hit: coverage.lines_hit(),
            line_percent: percent(coverage.lines_hit(), coverage.lines_found()),
            functions_found: coverage.functions_found(),
            functions_hit: coverage.functions_hit(),
            branches_found: coverage.branches_found(),
            branches_hit: coverage.branches_hit(),
        })
        .collect();

    let lines_found = files.iter().map(|f| f.lines_found).sum();
    let lines_hit = files.iter().map(|f| f.lines_hit).sum();

    CoverageSummary {
        lines_found,
        lines_hit,
        line_percent: percent(lines_hit, lines_found),
        functions_found: files.iter().map(|f| f.functions_found).sum(),
        functions_hit: files.iter().map(|f| f.functions_hit).sum(),
        branches_found: files.iter().map(|f| f.branches_found).sum(),
        branches_hit: files.iter().map(|f| f.branches_hit).sum(),
        files,
    }
}

fn table_row(width: usize, label: &str, percent: f64, counts: [(usize, usize); 3]) -> String {
    let [lines, functions, branches] = counts.map(|(hit, found)| format!("{}/{}", hit, found));
    format!(
        "{:<width$}  {:>6.1}%  {:>13}  {:>11}  {:>11}\n",
        label, percent, lines, functions, branches
    )
}

/// Render a summary as a plain-text table
pub fn render_summary(summary: &CoverageSummary) -> String {
    let width = summary
        .files
        .iter()
        .map(|f| f.path.len())
        .chain(std::iter::once("TOTAL".len()))
        .max()
        .unwrap_or(0);
    let rule = format!("{}\n", "-".repeat(width + 52));

    let mut out = format!(
        "{:<width$}  {:>7}  {:>13}  {:>11}  {:>11}\n",
        "File", "Lines", "Hit/Found", "Functions", "Branches"
    );
    out.push_str(&rule);
    for file in &summary.files {
        out.push_str(&table_row(
            width,
            &file.path,
            file.line_percent,
            [
                (file.lines_hit, file.lines_found),
                (file.functions_hit, file.functions_found),
                (file.branches_hit, file.branches_found),
            ],
        ));
    }
    out.push_str(&rule);
    out.push_str(&table_row(
        width,
        "TOTAL",
        summary.line_percent,
        [
            (summary.lines_hit, summary.lines_found),
            (summary.functions_hit, summary.functions_found),
            (summary.branches_hit, summary.branches_found),
        ],
    ));

    out
}
