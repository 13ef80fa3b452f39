use crate::error::{TrackerError, TrackerResult};
use crate::tracker::expenses::{Expense, NewExpense};
use crate::utils::datetime::{from_stored, to_stored};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub chat_id: i64,
    pub kind: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub spent_at: String,
}

impl ExpenseRecord {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        expense: &NewExpense,
        spent_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let spent_at = to_stored(&spent_at);

        sqlx::query(
            "INSERT INTO expenses (id, chat_id, kind, category, amount, description, spent_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(chat_id)
        .bind(expense.kind.as_str())
        .bind(expense.category)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(&spent_at)
        .execute(pool)
        .await?;

        Ok(ExpenseRecord {
            id,
            chat_id,
            kind: expense.kind.as_str().to_string(),
            category: expense.category.to_string(),
            amount: expense.amount,
            description: expense.description.clone(),
            spent_at,
        })
    }

    pub async fn find_by_chat_since(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ExpenseRecord>(
            "SELECT id, chat_id, kind, category, amount, description, spent_at FROM expenses WHERE chat_id = ? AND spent_at >= ? ORDER BY spent_at",
        )
        .bind(chat_id)
        .bind(to_stored(&since))
        .fetch_all(pool)
        .await
    }

    /// Deletes every expense of the chat and returns how many were removed.
    pub async fn delete_by_chat(pool: &sqlx::SqlitePool, chat_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE chat_id = ?")
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn into_expense(self) -> TrackerResult<Expense> {
        let kind = self
            .kind
            .parse()
            .map_err(|_| TrackerError::CorruptRecord(format!("expense kind '{}'", self.kind)))?;
        Ok(Expense {
            id: self.id,
            chat_id: self.chat_id,
            kind,
            category: self.category,
            amount: self.amount,
            description: self.description,
            spent_at: from_stored(&self.spent_at)?,
        })
    }
}
