use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m20250901_000001_create_report_artifacts::Migration),
            Box::new(migrations::m20250901_000002_create_grade_records::Migration),
        ]
    }
}
