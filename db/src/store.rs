//! Database-backed implementation of the grader's persistence seam.

use crate::models::{grade_record, report_artifact};
use async_trait::async_trait;
use grader::{GraderError, RewardStore};
use sea_orm::DatabaseConnection;

/// Reward ledger and artifact store backed by the relational database.
#[derive(Clone)]
pub struct SqlRewardStore {
    db: DatabaseConnection,
}

impl SqlRewardStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RewardStore for SqlRewardStore {
    async fn save_artifact(
        &self,
        email: &str,
        task: &str,
        report_xml: &str,
    ) -> Result<i64, GraderError> {
        report_artifact::Model::save_file(&self.db, email, task, report_xml)
            .await
            .map(|artifact| artifact.id)
            .map_err(|e| GraderError::Store(e.to_string()))
    }

    async fn record_pass(
        &self,
        email: &str,
        task: &str,
        test: &str,
        mark: u32,
        artifact_id: i64,
    ) -> Result<(), GraderError> {
        grade_record::Model::record_pass(&self.db, email, task, test, i64::from(mark), artifact_id)
            .await
            .map(|_| ())
            .map_err(|e| GraderError::Store(e.to_string()))
    }

    async fn record_fail(
        &self,
        email: &str,
        task: &str,
        test: &str,
        artifact_id: i64,
    ) -> Result<(), GraderError> {
        grade_record::Model::record_fail(&self.db, email, task, test, artifact_id)
            .await
            .map(|_| ())
            .map_err(|e| GraderError::Store(e.to_string()))
    }

    async fn passed_totals(&self, email: &str) -> Result<Vec<(String, u32)>, GraderError> {
        grade_record::Model::passed_totals(&self.db, email)
            .await
            .map(|totals| {
                totals
                    .into_iter()
                    .map(|(test, mark)| (test, mark.max(0) as u32))
                    .collect()
            })
            .map_err(|e| GraderError::Store(e.to_string()))
    }
}
