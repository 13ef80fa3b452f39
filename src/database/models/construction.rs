use crate::error::{TrackerError, TrackerResult};
use crate::tracker::construction::{
    ConstructionObject, ConstructionStage, ResponsiblePerson, StageComment,
};
use crate::utils::datetime::{from_stored, from_stored_opt, to_stored};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConstructionObjectRecord {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub address: String,
    pub stage: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponsiblePersonRecord {
    pub id: i64,
    pub object_id: i64,
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConstructionCommentRecord {
    pub id: i64,
    pub object_id: i64,
    pub stage: String,
    pub body: String,
    pub written_at: String,
}

fn parse_stage(value: &str) -> TrackerResult<ConstructionStage> {
    value
        .parse()
        .map_err(|_| TrackerError::CorruptRecord(format!("construction stage '{value}'")))
}

impl ConstructionObjectRecord {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        name: &str,
        address: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = to_stored(&Utc::now());
        let stage = ConstructionStage::Acceptance.as_str();

        let result = sqlx::query(
            r#"
            INSERT INTO construction_objects (chat_id, name, address, stage, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(chat_id)
        .bind(name)
        .bind(address)
        .bind(stage)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(ConstructionObjectRecord {
            id: result.last_insert_rowid(),
            chat_id,
            name: name.to_string(),
            address: address.to_string(),
            stage: stage.to_string(),
            created_at: now,
            completed_at: None,
        })
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        object_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConstructionObjectRecord>(
            "SELECT id, chat_id, name, address, stage, created_at, completed_at FROM construction_objects WHERE id = ?",
        )
        .bind(object_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConstructionObjectRecord>(
            "SELECT id, chat_id, name, address, stage, created_at, completed_at FROM construction_objects WHERE chat_id = ? ORDER BY completed_at IS NOT NULL, id",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_stage(
        pool: &sqlx::SqlitePool,
        object_id: i64,
        stage: ConstructionStage,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE construction_objects SET stage = ? WHERE id = ?")
            .bind(stage.as_str())
            .bind(object_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_completed(
        pool: &sqlx::SqlitePool,
        object_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE construction_objects SET completed_at = ? WHERE id = ?")
            .bind(to_stored(&at))
            .bind(object_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Loads the object together with its people and comments.
    pub async fn load(
        pool: &sqlx::SqlitePool,
        object_id: i64,
    ) -> TrackerResult<Option<ConstructionObject>> {
        let Some(record) = Self::find_by_id(pool, object_id).await? else {
            return Ok(None);
        };
        let persons = ResponsiblePersonRecord::find_by_object(pool, object_id).await?;
        let comments = ConstructionCommentRecord::find_by_object(pool, object_id).await?;
        record.into_object(persons, comments).map(Some)
    }

    pub fn into_object(
        self,
        persons: Vec<ResponsiblePersonRecord>,
        comments: Vec<ConstructionCommentRecord>,
    ) -> TrackerResult<ConstructionObject> {
        let comments = comments
            .into_iter()
            .map(ConstructionCommentRecord::into_comment)
            .collect::<TrackerResult<Vec<_>>>()?;

        Ok(ConstructionObject {
            id: self.id,
            chat_id: self.chat_id,
            name: self.name,
            address: self.address,
            stage: parse_stage(&self.stage)?,
            persons: persons.into_iter().map(ResponsiblePersonRecord::into_person).collect(),
            comments,
            created_at: from_stored(&self.created_at)?,
            completed_at: from_stored_opt(self.completed_at.as_deref())?,
        })
    }
}

impl ResponsiblePersonRecord {
    pub async fn add(
        pool: &sqlx::SqlitePool,
        object_id: i64,
        person: &ResponsiblePerson,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO responsible_persons (object_id, name, position, phone, email) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(object_id)
        .bind(&person.name)
        .bind(&person.position)
        .bind(&person.phone)
        .bind(&person.email)
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Ordered by insertion, so list positions stay stable.
    pub async fn find_by_object(
        pool: &sqlx::SqlitePool,
        object_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ResponsiblePersonRecord>(
            "SELECT id, object_id, name, position, phone, email FROM responsible_persons WHERE object_id = ? ORDER BY id",
        )
        .bind(object_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, person_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM responsible_persons WHERE id = ?")
            .bind(person_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub fn into_person(self) -> ResponsiblePerson {
        ResponsiblePerson {
            name: self.name,
            position: self.position,
            phone: self.phone,
            email: self.email,
        }
    }
}

impl ConstructionCommentRecord {
    pub async fn add(
        pool: &sqlx::SqlitePool,
        object_id: i64,
        comment: &StageComment,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO construction_comments (object_id, stage, body, written_at) VALUES (?, ?, ?, ?)",
        )
        .bind(object_id)
        .bind(comment.stage.as_str())
        .bind(&comment.text)
        .bind(to_stored(&comment.written_at))
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_object(
        pool: &sqlx::SqlitePool,
        object_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ConstructionCommentRecord>(
            "SELECT id, object_id, stage, body, written_at FROM construction_comments WHERE object_id = ? ORDER BY id",
        )
        .bind(object_id)
        .fetch_all(pool)
        .await
    }

    pub fn into_comment(self) -> TrackerResult<StageComment> {
        Ok(StageComment {
            stage: parse_stage(&self.stage)?,
            text: self.body,
            written_at: from_stored(&self.written_at)?,
        })
    }
}
