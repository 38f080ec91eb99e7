use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::fs;
use util::paths::{ensure_parent_dir, report_artifact_path, storage_root};

/// One raw suite report kept on disk for audit, with its row as the index.
/// The document itself lives under the storage root; `path` is relative so
/// the root can move between environments.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "report_artifacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub task: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Persist a report document. The row is inserted first so its id can
    /// name the file, then the document is written and the path patched in.
    pub async fn save_file(
        db: &DatabaseConnection,
        email: &str,
        task: &str,
        document: &str,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();

        let partial = ActiveModel {
            email: Set(email.to_string()),
            task: Set(task.to_string()),
            path: Set(String::new()),
            created_at: Set(now),
            ..Default::default()
        };

        let inserted: Model = partial.insert(db).await?;

        let file_path = report_artifact_path(email, inserted.id);
        ensure_parent_dir(&file_path)
            .map_err(|e| DbErr::Custom(format!("Failed to create artifact directory: {e}")))?;
        fs::write(&file_path, document)
            .map_err(|e| DbErr::Custom(format!("Failed to write report artifact: {e}")))?;

        let relative_path = file_path
            .strip_prefix(storage_root())
            .unwrap()
            .to_string_lossy()
            .to_string();

        let mut model: ActiveModel = inserted.into();
        model.path = Set(relative_path);
        model.update(db).await
    }

    /// Loads the report document from disk based on the stored relative path.
    pub fn load_file(&self) -> Result<String, std::io::Error> {
        fs::read_to_string(storage_root().join(&self.path))
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }
}
