use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::database::models::{RunningTaskRecord, StatusHistoryRecord};
use crate::error::{TrackerError, TrackerResult};
use crate::tracker::{DayStatus, Priority, RunningList, RunningTask, WeekStats};

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Week counters plus how many status changes were recorded since Monday.
#[derive(Debug, Clone)]
pub struct UserStats {
    pub week: WeekStats,
    pub actions_this_week: i64,
}

/// Persistent running lists. Every mutation loads the task, applies the
/// domain operation and writes the result back inside one transaction.
#[derive(Clone)]
pub struct RunningListService {
    pool: SqlitePool,
}

impl RunningListService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add_task(
        &self,
        user_id: i64,
        description: &str,
        priority: Priority,
        days: &[Weekday],
    ) -> TrackerResult<RunningTask> {
        let description = description.trim();
        if description.is_empty() {
            return Err(TrackerError::InvalidInput(
                "Task description cannot be empty".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(TrackerError::InvalidInput(format!(
                "Task description is too long (max {MAX_DESCRIPTION_LEN} characters)"
            )));
        }
        if days.is_empty() {
            return Err(TrackerError::InvalidInput(
                "Pick at least one day for the task".to_string(),
            ));
        }

        let mut task = RunningTask::new(0, user_id, description, priority, days);
        task.id = RunningTaskRecord::insert(&self.pool, &task).await?;
        info!("Created running task {} for user {}", task.id, user_id);
        Ok(task)
    }

    pub async fn list_for_user(&self, user_id: i64) -> TrackerResult<RunningList> {
        let records = RunningTaskRecord::find_by_user(&self.pool, user_id).await?;
        let task_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let history = StatusHistoryRecord::find_by_tasks(&self.pool, &task_ids).await?;

        let mut by_task: HashMap<i64, Vec<StatusHistoryRecord>> = HashMap::new();
        for entry in history {
            by_task.entry(entry.task_id).or_default().push(entry);
        }

        let tasks = records
            .into_iter()
            .map(|record| {
                let history = by_task.remove(&record.id).unwrap_or_default();
                record.into_task(history)
            })
            .collect::<TrackerResult<Vec<_>>>()?;

        Ok(RunningList::new(user_id, tasks))
    }

    /// Tasks of other users are reported as not found.
    pub async fn get_task(&self, user_id: i64, task_id: i64) -> TrackerResult<RunningTask> {
        let mut conn = self.pool.acquire().await?;
        load_owned(&mut conn, user_id, task_id).await
    }

    /// Records one status change and its history entry atomically.
    pub async fn set_day_status(
        &self,
        user_id: i64,
        task_id: i64,
        day: Weekday,
        status: DayStatus,
    ) -> TrackerResult<RunningTask> {
        let mut tx = self.pool.begin().await?;
        let mut task = load_owned(&mut tx, user_id, task_id).await?;

        let entry = task.set_status(day, status, Utc::now())?;
        RunningTaskRecord::update_state(&mut *tx, &task).await?;
        StatusHistoryRecord::append(&mut *tx, task.id, &entry).await?;
        tx.commit().await?;

        debug!("Task {} {:?} -> {}", task_id, day, status.as_str());
        Ok(task)
    }

    /// Returns the task and whether `day` is now scheduled.
    pub async fn toggle_day(
        &self,
        user_id: i64,
        task_id: i64,
        day: Weekday,
    ) -> TrackerResult<(RunningTask, bool)> {
        let mut tx = self.pool.begin().await?;
        let mut task = load_owned(&mut tx, user_id, task_id).await?;

        let scheduled = task.toggle_day(day)?;
        RunningTaskRecord::update_state(&mut *tx, &task).await?;
        tx.commit().await?;

        Ok((task, scheduled))
    }

    pub async fn complete_task(&self, user_id: i64, task_id: i64) -> TrackerResult<RunningTask> {
        let mut tx = self.pool.begin().await?;
        let mut task = load_owned(&mut tx, user_id, task_id).await?;

        task.complete(Utc::now())?;
        RunningTaskRecord::update_state(&mut *tx, &task).await?;
        tx.commit().await?;

        info!("Archived running task {}", task_id);
        Ok(task)
    }

    pub async fn reopen_task(&self, user_id: i64, task_id: i64) -> TrackerResult<RunningTask> {
        let mut tx = self.pool.begin().await?;
        let mut task = load_owned(&mut tx, user_id, task_id).await?;

        if !task.reopen() {
            return Err(TrackerError::InvalidInput(format!(
                "Task #{task_id} is not archived"
            )));
        }
        RunningTaskRecord::update_state(&mut *tx, &task).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Hard delete; the status history goes with the task.
    pub async fn delete_task(&self, user_id: i64, task_id: i64) -> TrackerResult<RunningTask> {
        let mut tx = self.pool.begin().await?;
        let task = load_owned(&mut tx, user_id, task_id).await?;

        RunningTaskRecord::delete(&mut *tx, task_id).await?;
        tx.commit().await?;

        info!("Deleted running task {} of user {}", task_id, user_id);
        Ok(task)
    }

    /// Resets the grid of every active task from its schedule. Returns the
    /// number of tasks rolled over.
    pub async fn rollover_week(&self) -> TrackerResult<usize> {
        let mut tx = self.pool.begin().await?;
        let records = RunningTaskRecord::find_active(&mut *tx).await?;

        let mut count = 0;
        for record in records {
            let mut task = record.into_task(Vec::new())?;
            task.start_new_week();
            RunningTaskRecord::update_state(&mut *tx, &task).await?;
            count += 1;
        }
        tx.commit().await?;

        info!("Weekly rollover reset {} running tasks", count);
        Ok(count)
    }

    pub async fn users_with_active_tasks(&self) -> TrackerResult<Vec<i64>> {
        Ok(RunningTaskRecord::active_user_ids(&self.pool).await?)
    }

    pub async fn stats(&self, user_id: i64) -> TrackerResult<UserStats> {
        let list = self.list_for_user(user_id).await?;
        let actions_this_week =
            StatusHistoryRecord::count_since(&self.pool, user_id, week_start(Utc::now())).await?;
        Ok(UserStats {
            week: list.week_stats(),
            actions_this_week,
        })
    }
}

async fn load_owned(
    conn: &mut SqliteConnection,
    user_id: i64,
    task_id: i64,
) -> TrackerResult<RunningTask> {
    let record = RunningTaskRecord::find_by_id(&mut *conn, task_id)
        .await?
        .filter(|record| record.user_id == user_id)
        .ok_or(TrackerError::TaskNotFound(task_id))?;
    let history = StatusHistoryRecord::find_by_task(&mut *conn, task_id).await?;
    record.into_task(history)
}

/// Monday 00:00 UTC of the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_start_is_monday_midnight() {
        let monday = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).single();
        let wednesday = Utc.with_ymd_and_hms(2024, 3, 13, 17, 45, 0).single();
        assert_eq!(wednesday.map(week_start), monday);
        assert_eq!(monday.map(week_start), monday);
    }
}
