//! Test execution engine.

use printf_core::Capabilities;
use printf_core::errno::{get_errno, set_errno};
use serde::{Deserialize, Serialize};

use crate::args::ArgPack;
use crate::decode::{SectionRecord, decode_sections};
use crate::fixtures::{FixtureCase, FixtureSet};

/// Outcome of one fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub case_name: String,
    pub passed: bool,
    /// The case needs a feature this build does not have.
    pub skipped: bool,
    /// Expected sections as JSON.
    pub expected: String,
    /// Decoded sections as JSON, or the argument error.
    pub actual: String,
    pub diff: Option<String>,
}

/// Totals over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: &[VerificationResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            if r.skipped {
                acc.skipped += 1;
            } else if r.passed {
                acc.passed += 1;
            } else {
                acc.failed += 1;
            }
            acc
        })
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    capabilities: Capabilities,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            capabilities: Capabilities::current(),
        }
    }

    /// Run all fixtures in a set and return results in case order.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| self.run_case(case))
            .collect()
    }

    fn run_case(&self, case: &FixtureCase) -> VerificationResult {
        let expected = to_json(&case.expected);
        if !case.requires.iter().all(|f| self.has_feature(f)) {
            return VerificationResult {
                case_name: case.name.clone(),
                passed: false,
                skipped: true,
                expected,
                actual: String::new(),
                diff: Some(format!("requires {}", case.requires.join(", "))),
            };
        }

        let pack = match ArgPack::parse(&case.args) {
            Ok(pack) => pack,
            Err(err) => {
                return VerificationResult {
                    case_name: case.name.clone(),
                    passed: false,
                    skipped: false,
                    expected,
                    actual: format!("args error: {err}"),
                    diff: None,
                };
            }
        };

        let saved = get_errno();
        set_errno(case.errno);
        let actual = decode_sections(case.format.as_bytes(), &pack);
        set_errno(saved);

        let diff = render_diff(&case.expected, &actual);
        VerificationResult {
            case_name: case.name.clone(),
            passed: diff.is_none(),
            skipped: false,
            expected,
            actual: to_json(&actual),
            diff,
        }
    }

    fn has_feature(&self, feature: &str) -> bool {
        let caps = self.capabilities;
        match feature {
            "float" => caps.float,
            "fixed-point" => caps.fixed_point,
            "index-mode" => caps.index_mode,
            "write-int" => caps.write_int,
            "strerror" => caps.strerror,
            _ => false,
        }
    }
}

fn to_json(records: &[SectionRecord]) -> String {
    serde_json::to_string(records).unwrap_or_default()
}

/// First disagreement between expected and decoded sections.
fn render_diff(expected: &[SectionRecord], actual: &[SectionRecord]) -> Option<String> {
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        if !e.matches(a) {
            return Some(format!(
                "section {i}: expected {} got {}",
                to_json(std::slice::from_ref(e)),
                to_json(std::slice::from_ref(a)),
            ));
        }
    }
    (expected.len() != actual.len()).then(|| {
        format!(
            "section count: expected {} got {}",
            expected.len(),
            actual.len()
        )
    })
}
