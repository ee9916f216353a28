//! Integration test: printf section fixtures
//!
//! Validates that:
//! 1. tests/fixtures/printf_sections.json loads and is non-empty.
//! 2. Every case whose features are compiled in decodes as expected.
//! 3. Expected sections in every case partition the format string.
//! 4. Runs are deterministic.
//!
//! Run: cargo test -p printf-harness --test fixture_suite_test

use std::path::{Path, PathBuf};

use printf_harness::fixtures::sha256_file;
use printf_harness::{FixtureSet, TestRunner, VerificationSummary};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/printf_sections.json")
}

fn load() -> FixtureSet {
    FixtureSet::from_file(&fixture_path()).expect("fixture file should load")
}

#[test]
fn fixture_file_loads() {
    let set = load();
    assert_eq!(set.version, "v1");
    assert!(!set.cases.is_empty());

    let mut names: Vec<_> = set.cases.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), set.cases.len(), "case names must be unique");
}

#[test]
fn all_fixture_cases_pass() {
    let set = load();
    let results = TestRunner::new("fixture-suite").run(&set);
    let failures: Vec<_> = results
        .iter()
        .filter(|r| !r.passed && !r.skipped)
        .map(|r| format!("{}: {}", r.case_name, r.diff.as_deref().unwrap_or(&r.actual)))
        .collect();
    assert!(failures.is_empty(), "failing cases:\n{}", failures.join("\n"));

    let summary = VerificationSummary::from_results(&results);
    assert_eq!(summary.total, set.cases.len());
    assert!(summary.passed > 0);
}

#[test]
fn expected_sections_partition_format() {
    for case in load().cases {
        let visible = case.format.split('\0').next().unwrap_or_default();
        let joined: String = case.expected.iter().map(|s| s.raw.as_str()).collect();
        assert_eq!(joined, visible, "case {}", case.name);
    }
}

#[test]
fn runs_are_deterministic() {
    let set = load();
    let runner = TestRunner::new("determinism");
    let first: Vec<_> = runner.run(&set).into_iter().map(|r| r.actual).collect();
    let second: Vec<_> = runner.run(&set).into_iter().map(|r| r.actual).collect();
    assert_eq!(first, second);
}

#[test]
fn fixture_round_trips_through_json() {
    let set = load();
    let reparsed = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
    assert_eq!(reparsed.cases.len(), set.cases.len());
    let results = TestRunner::new("round-trip").run(&reparsed);
    assert!(results.iter().all(|r| r.passed || r.skipped));
}

#[test]
fn fixture_digest_is_stable() {
    let a = sha256_file(&fixture_path()).unwrap();
    let b = sha256_file(&fixture_path()).unwrap();
    assert_eq!(a.len(), 64);
    assert_eq!(a, b);
}
