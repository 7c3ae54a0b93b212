use covrelay::CoverageDataset;
use covrelay::coverage::filter::{ExclusionSet, filter_dataset};
use covrelay::coverage::lcov::{parse_tracefile, read_tracefile};
use covrelay::report::{ServiceInfo, to_coveralls};
use serde_json::json;
use std::fs;
use std::path::Path;

mod common;
use common::fixture_path;

#[test]
fn test_empty_dataset_gives_valid_payload() {
    let payload = to_coveralls(
        &CoverageDataset::default(),
        Path::new("/nowhere"),
        &ServiceInfo::default(),
    );

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value, json!({ "source_files": [] }));
}

#[test]
fn test_garbage_tracefile_gives_valid_payload() {
    let dataset = parse_tracefile("\u{0}\u{1} definitely not lcov\nDA:1,1\n");
    let payload = to_coveralls(&dataset, Path::new("."), &ServiceInfo::default());

    let text = serde_json::to_string(&payload).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["source_files"], json!([]));
}

#[test]
fn test_coverage_array_sized_from_source() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.c"), "int main() {\n  return 0;\n}\n\n// end\n").unwrap();

    let dataset = read_tracefile(&fixture_path("mixed.info")).unwrap();
    let filtered = filter_dataset(&dataset, &ExclusionSet::default());
    let service = ServiceInfo {
        service_name: Some("github-actions".to_string()),
        service_job_id: Some("42".to_string()),
    };
    let payload = to_coveralls(&filtered, dir.path(), &service);

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({
            "service_name": "github-actions",
            "service_job_id": "42",
            "source_files": [{
                "name": "a.c",
                "coverage": [1, 1, 1, null, null],
                "branches": [2, 0, 0, 1, 2, 0, 1, 0]
            }]
        })
    );
}

#[test]
fn test_missing_source_sized_from_trace_and_made_relative() {
    let dataset = parse_tracefile("SF:/work/src/x.c\nDA:2,0\nDA:4,7\nend_of_record\n");
    let payload = to_coveralls(&dataset, Path::new("/work"), &ServiceInfo::default());

    let file = &payload.source_files[0];
    assert_eq!(file.name, "src/x.c");
    assert_eq!(file.coverage, vec![None, Some(0), None, Some(7)]);
}

#[test]
fn test_token_only_added_for_upload() {
    let payload = to_coveralls(
        &CoverageDataset::default(),
        Path::new("."),
        &ServiceInfo::default(),
    );
    let signed = payload.with_token("secret");

    assert_eq!(payload.repo_token, None);
    assert_eq!(signed.repo_token.as_deref(), Some("secret"));
    assert_eq!(serde_json::to_value(&signed).unwrap()["repo_token"], "secret");
}

#[test]
fn test_huge_line_number_without_source_is_dropped() {
    let dataset = parse_tracefile("SF:a.c\nDA:2,1\nDA:4000000000,1\nend_of_record\n");
    let payload = to_coveralls(&dataset, Path::new("/nowhere"), &ServiceInfo::default());

    assert_eq!(payload.source_files[0].coverage, vec![None, Some(1)]);
}

#[test]
fn test_lines_far_past_source_end_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.c"), "one\ntwo\n").unwrap();
    let dataset = parse_tracefile("SF:a.c\nDA:1,3\nDA:50,1\nDA:100000,1\nend_of_record\n");

    let payload = to_coveralls(&dataset, dir.path(), &ServiceInfo::default());

    let coverage = &payload.source_files[0].coverage;
    assert_eq!(coverage.len(), 50);
    assert_eq!(coverage[0], Some(3));
    assert_eq!(coverage[49], Some(1));
}

#[test]
fn test_line_zero_and_max_counts_convert() {
    let dataset = parse_tracefile(&format!(
        "SF:z.c\nDA:0,5\nDA:1,{}\nend_of_record\n",
        u64::MAX
    ));
    let payload = to_coveralls(&dataset, Path::new("/nowhere"), &ServiceInfo::default());

    assert_eq!(payload.source_files[0].coverage, vec![Some(u64::MAX)]);
    assert!(serde_json::to_string(&payload).is_ok());
}
