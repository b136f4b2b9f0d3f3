use crate::domain::test_case::{present_text, RawTestCase, TestCase, TestRun};
use serde_json::Value;

/// Values stamped onto every test case of one generation batch.
#[derive(Debug, Clone)]
pub struct BatchInfo<'a> {
    pub run_dates: &'a [String],
    pub release_version: &'a str,
    pub tester_name: &'a str,
    pub date_generated: &'a str,
}

/// Maps loosely-shaped model output to test cases. Never fails: anything
/// missing is replaced by a positional default.
pub fn normalize_test_cases(items: &[Value], batch: &BatchInfo<'_>) -> Vec<TestCase> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| normalize_one(idx + 1, &RawTestCase::from_value(item), batch))
        .collect()
}

fn normalize_one(position: usize, raw: &RawTestCase, batch: &BatchInfo<'_>) -> TestCase {
    let tc_id = present_text(&raw.tc_id).unwrap_or_else(|| format!("TC{:03}", position));
    let scenario = present_text(&raw.scenario)
        .or_else(|| present_text(&raw.title))
        .unwrap_or_else(|| format!("Scenario {}", position));
    let steps = present_text(&raw.steps)
        .or_else(|| present_text(&raw.test_case_steps))
        .unwrap_or_default();
    let expected_result = present_text(&raw.expected_result)
        .or_else(|| present_text(&raw.expected))
        .unwrap_or_default();

    TestCase {
        ts_id: format!("TS{:03}", position),
        tc_id,
        scenario,
        steps,
        expected_result,
        release_version: batch.release_version.to_string(),
        date_generated: batch.date_generated.to_string(),
        tester_name: batch.tester_name.to_string(),
        runs: batch
            .run_dates
            .iter()
            .map(|run_date| TestRun::scheduled(run_date))
            .collect(),
    }
}
