use covrelay::cli::exclusion_patterns;
use covrelay::context::PipelineContext;
use covrelay::coverage::capture::TracefileCapturer;
use covrelay::coverage::lcov::read_tracefile;
use covrelay::diffcover::DiffCoverageOutcome;
use covrelay::pipeline::{CoverageReporter, ReporterConfig, RunStatus};
use covrelay::report::ServiceInfo;
use covrelay::types::errors::Error;
use covrelay::upload::Backend;
use covrelay::utils::paths::{coveralls_payload_path, filtered_tracefile_path, raw_tracefile_path};
use rstest::*;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

mod common;
use common::{FakeClient, FakeRunner, fixture_path};

#[fixture]
fn workdir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("build")).unwrap();
    fs::copy(fixture_path("mixed.info"), dir.path().join("build/trace.info")).unwrap();
    fs::write(dir.path().join("a.c"), "int main() {\n  return 0;\n}\n").unwrap();
    dir
}

fn config(dir: &TempDir) -> ReporterConfig {
    ReporterConfig {
        working_dir: dir.path().to_path_buf(),
        artifacts_dir: dir.path().join(".covrelay"),
        exclusions: exclusion_patterns(&[]),
        summary_json: Some(dir.path().join("summary.json")),
        service: ServiceInfo::default(),
        compare_branch: "origin/main".to_string(),
        clean: false,
    }
}

fn context(runtime: &str, docker: &str) -> PipelineContext {
    PipelineContext {
        matrix_os: "ubuntu-latest".to_string(),
        runtime_version: runtime.to_string(),
        docker: docker.to_string(),
        codecov_token: Some("cc".to_string()),
        coveralls_token: Some("cv".to_string()),
    }
}

fn backends<'a>(
    context: &PipelineContext,
    failing: &[&str],
    log: &Rc<RefCell<Vec<String>>>,
) -> Vec<Backend<'a>> {
    [
        ("coveralls", "COVERALLS_REPO_TOKEN", context.coveralls_token.clone()),
        ("codecov", "CODECOV_TOKEN", context.codecov_token.clone()),
    ]
    .into_iter()
    .map(|(name, token_var, token)| Backend {
        name,
        token_var,
        token,
        client: Box::new(FakeClient {
            name,
            fail: failing.contains(&name),
            log: Rc::clone(log),
        }),
    })
    .collect()
}

#[rstest]
fn test_summary_mentions_project_files_only(workdir: TempDir) {
    let context = context("3.6", "");
    let config = config(&workdir);
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    let report = reporter.run().unwrap();

    assert!(report.summary_text.contains("a.c"));
    assert!(!report.summary_text.contains("stdio.h"));
    assert!(report.summary_text.contains("100.0%"));
    assert_eq!(report.summary.files.len(), 1);
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.status().exit_code(), 0);
    assert_eq!(*log.borrow(), vec!["coveralls:cv", "codecov:cc"]);
    assert_eq!(report.diff_coverage, DiffCoverageOutcome::Skipped);
    assert!(runner.calls().is_empty());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(workdir.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["files"][0]["path"], "a.c");
}

#[rstest]
fn test_raw_dataset_is_kept_beside_filtered(workdir: TempDir) {
    let context = context("3.6", "");
    let config = config(&workdir);
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    reporter.run().unwrap();

    let raw = read_tracefile(&raw_tracefile_path(&config.artifacts_dir)).unwrap();
    let filtered = read_tracefile(&filtered_tracefile_path(&config.artifacts_dir)).unwrap();
    assert!(raw.files.contains_key("/usr/include/stdio.h"));
    assert!(!filtered.files.contains_key("/usr/include/stdio.h"));

    let payload = fs::read_to_string(coveralls_payload_path(&config.artifacts_dir)).unwrap();
    assert!(payload.contains("\"name\": \"a.c\""));
    assert!(!payload.contains("repo_token"));
}

#[rstest]
fn test_missing_trace_data_aborts_before_upload() {
    let empty = tempfile::tempdir().unwrap();
    let context = context("3.7", "");
    let config = config(&empty);
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    let result = reporter.run();

    assert!(matches!(result, Err(Error::NoTraceData(_))));
    assert!(log.borrow().is_empty());
    assert!(runner.calls().is_empty());
}

#[rstest]
fn test_upload_failure_sets_status_but_others_run(workdir: TempDir) {
    let context = context("3.6", "");
    let config = config(&workdir);
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &["coveralls"], &log),
    );

    let report = reporter.run().unwrap();

    assert_eq!(*log.borrow(), vec!["coveralls:cv", "codecov:cc"]);
    assert_eq!(report.status(), RunStatus::UploadFailed);
    assert_eq!(report.status().exit_code(), 2);
}

#[rstest]
#[case::runs("3.7", "", true)]
#[case::other_runtime("3.6", "", false)]
#[case::in_docker("3.7", "1", false)]
fn test_diff_coverage_branch(
    workdir: TempDir,
    #[case] runtime: &str,
    #[case] docker: &str,
    #[case] runs: bool,
) {
    let context = context(runtime, docker);
    let config = config(&workdir);
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    let report = reporter.run().unwrap();

    if runs {
        assert_eq!(report.diff_coverage, DiffCoverageOutcome::Succeeded);
        let filtered = filtered_tracefile_path(&config.artifacts_dir);
        assert_eq!(
            runner.calls(),
            vec![
                "pip install diff_cover".to_string(),
                format!(
                    "diff-cover {} --compare-branch=origin/main",
                    filtered.display()
                ),
            ]
        );
    } else {
        assert_eq!(report.diff_coverage, DiffCoverageOutcome::Skipped);
        assert!(runner.calls().is_empty());
    }
}

#[rstest]
fn test_diff_coverage_failure_is_independent(workdir: TempDir) {
    let context = context("3.7", "");
    let config = config(&workdir);
    let runner = FakeRunner::failing(&["pip"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    let report = reporter.run().unwrap();

    assert!(matches!(report.diff_coverage, DiffCoverageOutcome::Failed(_)));
    assert!(!runner.ran("diff-cover"));
    assert!(report.uploads.iter().all(|outcome| outcome.succeeded()));
    assert_eq!(report.status(), RunStatus::DiffCoverageFailed);
    assert_eq!(report.status().exit_code(), 3);
}

#[rstest]
fn test_clean_removes_intermediate_files(workdir: TempDir) {
    let context = context("3.6", "");
    let mut config = config(&workdir);
    config.clean = true;
    let runner = FakeRunner::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let reporter = CoverageReporter::new(
        &context,
        &config,
        &runner,
        &TracefileCapturer,
        backends(&context, &[], &log),
    );

    reporter.run().unwrap();

    assert!(!config.artifacts_dir.exists());
    assert!(workdir.path().join("build/trace.info").exists());
}
