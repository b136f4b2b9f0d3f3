use crate::domain::error::Result;
use crate::domain::test_case::{ResultUpdate, Session};
use crate::infrastructure::session_store::SessionStore;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOutcome {
    pub applied: usize,
    pub skipped: usize,
}

pub struct LogResultsUseCase {
    store: Arc<dyn SessionStore>,
}

impl LogResultsUseCase {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Best-effort merge: unknown tc_ids and out-of-range run indexes are skipped.
    pub fn execute(&self, session_id: &str, updates: &[ResultUpdate]) -> Result<LogOutcome> {
        let mut outcome = LogOutcome::default();
        self.store.update(session_id, &mut |session: &mut Session| {
            outcome = apply_updates(session, updates);
        })?;

        debug!(
            session_id,
            applied = outcome.applied,
            skipped = outcome.skipped,
            "Logged run results"
        );
        Ok(outcome)
    }
}

pub fn apply_updates(session: &mut Session, updates: &[ResultUpdate]) -> LogOutcome {
    let mut outcome = LogOutcome::default();

    for update in updates {
        let Some(test_case) = session
            .test_cases
            .iter_mut()
            .find(|tc| Some(tc.tc_id.as_str()) == update.tc_id.as_deref())
        else {
            outcome.skipped += 1;
            continue;
        };

        let run = usize::try_from(update.run_index)
            .ok()
            .and_then(|index| test_case.runs.get_mut(index));
        let Some(run) = run else {
            outcome.skipped += 1;
            continue;
        };

        if let Some(status) = &update.status {
            run.status = status.clone();
        }
        if let Some(actual_result) = &update.actual_result {
            run.actual_result = actual_result.clone();
        }
        if let Some(bug_id) = &update.bug_id {
            run.bug_id = bug_id.clone();
        }
        if let Some(commit_id) = &update.commit_id {
            run.commit_id = commit_id.clone();
        }
        outcome.applied += 1;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::test_case::{TestCase, TestRun};
    use crate::infrastructure::session_store::InMemorySessionStore;

    fn test_case(tc_id: &str, ts_id: &str) -> TestCase {
        TestCase {
            ts_id: ts_id.to_string(),
            tc_id: tc_id.to_string(),
            scenario: "Scenario".to_string(),
            steps: String::new(),
            expected_result: String::new(),
            release_version: "v1.0.0".to_string(),
            date_generated: "2025-10-17".to_string(),
            tester_name: "Tester".to_string(),
            runs: vec![TestRun::scheduled("17/10/2025"), TestRun::scheduled("29/10/2025")],
        }
    }

    fn session() -> Session {
        Session {
            session_id: String::new(),
            test_cases: vec![
                test_case("TC001", "TS001"),
                test_case("TC002", "TS002"),
                test_case("TC001", "TS003"),
            ],
            release_version: "v1.0.0".to_string(),
            tester_name: "Tester".to_string(),
            description: "Login".to_string(),
            run_dates: vec!["17/10/2025".to_string(), "29/10/2025".to_string()],
            used_model: "models/gemini-2.5-flash".to_string(),
        }
    }

    fn update(tc_id: &str, run_index: i64) -> ResultUpdate {
        ResultUpdate {
            tc_id: Some(tc_id.to_string()),
            run_index,
            ..ResultUpdate::default()
        }
    }

    #[test]
    fn test_only_present_fields_are_overwritten() {
        let mut session = session();
        session.test_cases[1].runs[0].bug_id = "BUG-7".to_string();

        let outcome = apply_updates(
            &mut session,
            &[ResultUpdate {
                status: Some("FAIL".to_string()),
                actual_result: Some("Spinner never stops".to_string()),
                ..update("TC002", 0)
            }],
        );

        let run = &session.test_cases[1].runs[0];
        assert_eq!(outcome, LogOutcome { applied: 1, skipped: 0 });
        assert_eq!(run.status, "FAIL");
        assert_eq!(run.actual_result, "Spinner never stops");
        assert_eq!(run.bug_id, "BUG-7");
        assert_eq!(run.commit_id, "");
        assert_eq!(session.test_cases[1].runs[1], TestRun::scheduled("29/10/2025"));
    }

    #[test]
    fn test_first_matching_tc_id_wins() {
        let mut session = session();
        apply_updates(
            &mut session,
            &[ResultUpdate {
                status: Some("PASS".to_string()),
                ..update("TC001", 1)
            }],
        );

        assert_eq!(session.test_cases[0].runs[1].status, "PASS");
        assert_eq!(session.test_cases[2].runs[1].status, "Not Started");
    }

    #[test]
    fn test_out_of_range_and_unknown_are_skipped() {
        let mut session = session();
        let before = session.test_cases.clone();

        let outcome = apply_updates(
            &mut session,
            &[
                ResultUpdate {
                    status: Some("PASS".to_string()),
                    ..update("TC001", 5)
                },
                ResultUpdate {
                    status: Some("PASS".to_string()),
                    ..update("TC001", -1)
                },
                ResultUpdate {
                    status: Some("PASS".to_string()),
                    ..update("TC404", 0)
                },
            ],
        );

        assert_eq!(outcome, LogOutcome { applied: 0, skipped: 3 });
        assert_eq!(session.test_cases, before);
    }

    #[test]
    fn test_execute_against_store() {
        let store = Arc::new(InMemorySessionStore::new());
        let session_id = store.create(session());
        let use_case = LogResultsUseCase::new(store.clone());

        let outcome = use_case
            .execute(
                &session_id,
                &[ResultUpdate {
                    status: Some("PASS".to_string()),
                    ..update("TC002", 0)
                }],
            )
            .unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(store.get(&session_id).unwrap().test_cases[1].runs[0].status, "PASS");
        assert!(matches!(
            use_case.execute("missing", &[]),
            Err(AppError::SessionNotFound(_))
        ));
    }
}
