use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use std::collections::HashMap;

/// One test outcome for one student at one point in time, annotated with the
/// mark it earned. The table is append-only: a rerun inserts fresh rows and
/// never updates old ones, so the grading history stays intact.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "grade_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub task: String,
    pub test: String,
    pub passed: bool,
    pub mark: i64,
    pub artifact_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report_artifact::Entity",
        from = "Column::ArtifactId",
        to = "super::report_artifact::Column::Id"
    )]
    ReportArtifact,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Record a passed test and the mark it earned.
    pub async fn record_pass(
        db: &DatabaseConnection,
        email: &str,
        task: &str,
        test: &str,
        mark: i64,
        artifact_id: i64,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            email: Set(email.to_string()),
            task: Set(task.to_string()),
            test: Set(test.to_string()),
            passed: Set(true),
            mark: Set(mark),
            artifact_id: Set(artifact_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Record a failed test. Failures never carry marks.
    pub async fn record_fail(
        db: &DatabaseConnection,
        email: &str,
        task: &str,
        test: &str,
        artifact_id: i64,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            email: Set(email.to_string()),
            task: Set(task.to_string()),
            test: Set(test.to_string()),
            passed: Set(false),
            mark: Set(0),
            artifact_id: Set(artifact_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Full grading history for one student, oldest first.
    pub async fn for_student(db: &DatabaseConnection, email: &str) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email))
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Best mark per passed test for one student, sorted by test id.
    ///
    /// History accumulates one row per run, so the same test can appear many
    /// times; only the highest mark counts towards the student's total.
    pub async fn passed_totals(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Vec<(String, i64)>, DbErr> {
        let rows = Entity::find()
            .filter(Column::Email.eq(email))
            .filter(Column::Passed.eq(true))
            .all(db)
            .await?;

        let mut best: HashMap<String, i64> = HashMap::new();
        for row in rows {
            let entry = best.entry(row.test).or_insert(row.mark);
            if row.mark > *entry {
                *entry = row.mark;
            }
        }

        let mut totals: Vec<(String, i64)> = best.into_iter().collect();
        totals.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(totals)
    }
}
