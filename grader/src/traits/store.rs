//! Persistence seam for the reconciler.
//!
//! The grader never talks to the database directly; it records outcomes
//! through this trait so that tests can substitute an in-memory ledger.

use crate::error::GraderError;
use async_trait::async_trait;

/// Durable ledger for grading outcomes and raw report artifacts.
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Persist the raw suite report for audit, returning an artifact id.
    async fn save_artifact(
        &self,
        email: &str,
        task: &str,
        report_xml: &str,
    ) -> Result<i64, GraderError>;

    /// Record a passed test together with the mark it earned.
    async fn record_pass(
        &self,
        email: &str,
        task: &str,
        test: &str,
        mark: u32,
        artifact_id: i64,
    ) -> Result<(), GraderError>;

    /// Record a failed test (mark is always zero).
    async fn record_fail(
        &self,
        email: &str,
        task: &str,
        test: &str,
        artifact_id: i64,
    ) -> Result<(), GraderError>;

    /// Best mark per test the student has passed so far, as `(test, mark)` rows.
    async fn passed_totals(&self, email: &str) -> Result<Vec<(String, u32)>, GraderError>;
}
