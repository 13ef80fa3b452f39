use crate::error::{TrackerError, TrackerResult};
use crate::tracker::week::{day_at, day_index};
use crate::tracker::{DayStatus, Priority, RunningTask, Schedule, StatusEntry, WeekGrid};
use crate::utils::datetime::{from_stored, from_stored_opt, to_stored};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RunningTaskRecord {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub priority: String,
    pub schedule: String, // seven '0'/'1'
    pub week: String,     // seven status codes, '-' when off
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StatusHistoryRecord {
    pub id: i64,
    pub task_id: i64,
    pub day: i64, // 0 = Monday
    pub status: String,
    pub recorded_at: String,
}

const TASK_COLUMNS: &str =
    "id, user_id, description, priority, schedule, week, created_at, completed_at";

impl RunningTaskRecord {
    /// Inserts the task's current state and returns the new id.
    pub async fn insert<'e, E>(executor: E, task: &RunningTask) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO running_tasks (user_id, description, priority, schedule, week, created_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.user_id)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .bind(task.schedule.encode())
        .bind(task.week.encode())
        .bind(to_stored(&task.created_at))
        .bind(task.completed_at.as_ref().map(to_stored))
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id<'e, E>(executor: E, task_id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!("SELECT {TASK_COLUMNS} FROM running_tasks WHERE id = ?");
        sqlx::query_as::<_, RunningTaskRecord>(&query)
            .bind(task_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!("SELECT {TASK_COLUMNS} FROM running_tasks WHERE user_id = ? ORDER BY id");
        sqlx::query_as::<_, RunningTaskRecord>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Every task that is not archived, across all users.
    pub async fn find_active<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM running_tasks WHERE completed_at IS NULL ORDER BY user_id, id"
        );
        sqlx::query_as::<_, RunningTaskRecord>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn active_user_ids<'e, E>(executor: E) -> Result<Vec<i64>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT user_id FROM running_tasks WHERE completed_at IS NULL ORDER BY user_id",
        )
        .fetch_all(executor)
        .await
    }

    /// Writes back everything a task mutation can change.
    pub async fn update_state<'e, E>(executor: E, task: &RunningTask) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE running_tasks SET priority = ?, schedule = ?, week = ?, completed_at = ? WHERE id = ?",
        )
        .bind(task.priority.as_str())
        .bind(task.schedule.encode())
        .bind(task.week.encode())
        .bind(task.completed_at.as_ref().map(to_stored))
        .bind(task.id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(executor: E, task_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM running_tasks WHERE id = ?")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub fn into_task(self, history: Vec<StatusHistoryRecord>) -> TrackerResult<RunningTask> {
        let priority: Priority = self
            .priority
            .parse()
            .map_err(|_| TrackerError::CorruptRecord(format!("priority '{}'", self.priority)))?;
        let history = history
            .into_iter()
            .map(StatusHistoryRecord::into_entry)
            .collect::<TrackerResult<Vec<_>>>()?;

        Ok(RunningTask::restore(
            self.id,
            self.user_id,
            self.description,
            priority,
            Schedule::decode(&self.schedule)?,
            WeekGrid::decode(&self.week)?,
            history,
            from_stored(&self.created_at)?,
            from_stored_opt(self.completed_at.as_deref())?,
        ))
    }
}

impl StatusHistoryRecord {
    pub async fn append<'e, E>(executor: E, task_id: i64, entry: &StatusEntry) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO task_status_history (task_id, day, status, recorded_at) VALUES (?, ?, ?, ?)",
        )
        .bind(task_id)
        .bind(day_index(entry.day) as i64)
        .bind(entry.status.as_str())
        .bind(to_stored(&entry.recorded_at))
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_task<'e, E>(executor: E, task_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, StatusHistoryRecord>(
            "SELECT id, task_id, day, status, recorded_at FROM task_status_history WHERE task_id = ? ORDER BY id",
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Batch fetch history for multiple tasks to avoid N+1 queries
    pub async fn find_by_tasks<'e, E>(executor: E, task_ids: &[i64]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = task_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT id, task_id, day, status, recorded_at FROM task_status_history WHERE task_id IN ({placeholders}) ORDER BY task_id, id"
        );

        let mut query_builder = sqlx::query_as::<_, StatusHistoryRecord>(&query);
        for task_id in task_ids {
            query_builder = query_builder.bind(task_id);
        }

        query_builder.fetch_all(executor).await
    }

    /// Entries recorded at or after `since`, for weekly statistics.
    pub async fn count_since<'e, E>(
        executor: E,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM task_status_history h
            JOIN running_tasks t ON t.id = h.task_id
            WHERE t.user_id = ? AND h.recorded_at >= ?
            "#,
        )
        .bind(user_id)
        .bind(to_stored(&since))
        .fetch_one(executor)
        .await
    }

    pub fn into_entry(self) -> TrackerResult<StatusEntry> {
        if !(0..7).contains(&self.day) {
            return Err(TrackerError::CorruptRecord(format!("history day {}", self.day)));
        }
        let status: DayStatus = self
            .status
            .parse()
            .map_err(|_| TrackerError::CorruptRecord(format!("history status '{}'", self.status)))?;
        Ok(StatusEntry {
            day: day_at(self.day as usize),
            status,
            recorded_at: from_stored(&self.recorded_at)?,
        })
    }
}
