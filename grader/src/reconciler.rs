//! Turns per-test verdicts into ledger entries and marks.
//!
//! The catalog's reward projection is the only authority on what a pass is
//! worth: a test id missing from the projection earns nothing no matter what
//! the suite reported. That keeps stray suite output (setup fixtures, smoke
//! checks, a tampered report) from minting marks.

use crate::catalog::Catalog;
use crate::report::TestOutcomeMap;
use crate::traits::store::RewardStore;
use serde::Serialize;
use tracing::{debug, error, warn};

/// One reconciled test verdict with the mark it earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    pub test: String,
    pub passed: bool,
    pub mark: u32,
}

/// Aggregate result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub awarded: u32,
    pub results: Vec<TestRecord>,
}

/// Reconcile a parsed report against the catalog and persist the outcome.
///
/// Storage failures are logged and skipped rather than propagated: the
/// student still gets their summary, and the raw report on disk remains the
/// recovery path. Records are written in test-name order so reruns produce
/// identical ledgers.
pub async fn reconcile(
    store: &dyn RewardStore,
    catalog: &Catalog,
    email: &str,
    task_name: &str,
    report_xml: &str,
    outcomes: &TestOutcomeMap,
) -> ReconcileSummary {
    let projection = catalog.reward_projection();

    let artifact_id = match store.save_artifact(email, task_name, report_xml).await {
        Ok(id) => Some(id),
        Err(e) => {
            error!("failed to persist report artifact for {email}: {e}");
            None
        }
    };

    let mut ordered: Vec<(&String, &bool)> = outcomes.iter().collect();
    ordered.sort_by_key(|(test, _)| test.as_str());

    let mut results = Vec::with_capacity(ordered.len());
    let mut awarded: u32 = 0;

    for (test, &passed) in ordered {
        let mark = if passed {
            match projection.get(test) {
                Some(&reward) => reward,
                None => {
                    warn!("passed test '{test}' is not in the catalog projection, awarding nothing");
                    0
                }
            }
        } else {
            0
        };

        // Ledger rows reference the artifact; without one there is nothing
        // durable to attach them to, so persistence is skipped wholesale.
        if let Some(artifact_id) = artifact_id {
            let written = if passed {
                store
                    .record_pass(email, task_name, test, mark, artifact_id)
                    .await
            } else {
                store.record_fail(email, task_name, test, artifact_id).await
            };
            if let Err(e) = written {
                error!("failed to record outcome of '{test}' for {email}: {e}");
            }
        }

        awarded += mark;
        results.push(TestRecord {
            test: test.clone(),
            passed,
            mark,
        });
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let summary = ReconcileSummary {
        total: results.len(),
        passed,
        failed: results.len() - passed,
        awarded,
        results,
    };
    debug!(
        "reconciled {} outcomes for {email}: {}/{} passed, {} marks",
        summary.total, summary.passed, summary.total, summary.awarded
    );
    summary
}
