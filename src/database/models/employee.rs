use crate::error::{TrackerError, TrackerResult};
use crate::tracker::timesheet::{Employee, TimesheetEntry, WorkStatus};
use crate::utils::datetime::{date_from_stored, from_stored, to_stored};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub position: String,
    pub daily_salary: f64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimesheetEntryRecord {
    pub employee_id: i64,
    pub work_date: String, // YYYY-MM-DD
    pub status: String,
    pub hours_worked: f64,
    pub created_at: String,
}

impl EmployeeRecord {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        name: &str,
        position: &str,
        daily_salary: f64,
    ) -> Result<Self, sqlx::Error> {
        let now = to_stored(&Utc::now());
        let result = sqlx::query(
            r#"
            INSERT INTO employees (chat_id, name, position, daily_salary, is_active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(chat_id)
        .bind(name)
        .bind(position)
        .bind(daily_salary)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(EmployeeRecord {
            id: result.last_insert_rowid(),
            chat_id,
            name: name.to_string(),
            position: position.to_string(),
            daily_salary,
            is_active: true,
            created_at: now,
        })
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        employee_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeRecord>(
            "SELECT id, chat_id, name, position, daily_salary, is_active, created_at FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_active_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeRecord>(
            "SELECT id, chat_id, name, position, daily_salary, is_active, created_at FROM employees WHERE chat_id = ? AND is_active = 1 ORDER BY name",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    /// Removes the employee from the timesheet while keeping past entries.
    pub async fn deactivate(pool: &sqlx::SqlitePool, employee_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE employees SET is_active = 0 WHERE id = ? AND is_active = 1")
            .bind(employee_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub fn into_employee(self) -> TrackerResult<Employee> {
        Ok(Employee {
            id: self.id,
            chat_id: self.chat_id,
            name: self.name,
            position: self.position,
            daily_salary: self.daily_salary,
            is_active: self.is_active,
            created_at: from_stored(&self.created_at)?,
        })
    }
}

impl TimesheetEntryRecord {
    /// One entry per employee and date; marking a date again replaces it.
    pub async fn upsert(pool: &sqlx::SqlitePool, entry: &TimesheetEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO timesheet_entries (employee_id, work_date, status, hours_worked, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(employee_id, work_date)
            DO UPDATE SET status = excluded.status, hours_worked = excluded.hours_worked, created_at = excluded.created_at
            "#,
        )
        .bind(entry.employee_id)
        .bind(entry.date.to_string())
        .bind(entry.status.as_str())
        .bind(entry.hours_worked)
        .bind(to_stored(&Utc::now()))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Batch fetch entries of several employees within `[start, end]`.
    pub async fn find_by_employees_between(
        pool: &sqlx::SqlitePool,
        employee_ids: &[i64],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = employee_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query = format!(
            "SELECT employee_id, work_date, status, hours_worked, created_at FROM timesheet_entries WHERE employee_id IN ({placeholders}) AND work_date BETWEEN ? AND ? ORDER BY employee_id, work_date"
        );

        let mut query_builder = sqlx::query_as::<_, TimesheetEntryRecord>(&query);
        for employee_id in employee_ids {
            query_builder = query_builder.bind(employee_id);
        }

        query_builder
            .bind(start.to_string())
            .bind(end.to_string())
            .fetch_all(pool)
            .await
    }

    pub fn into_entry(self) -> TrackerResult<TimesheetEntry> {
        let status: WorkStatus = self
            .status
            .parse()
            .map_err(|_| TrackerError::CorruptRecord(format!("work status '{}'", self.status)))?;
        Ok(TimesheetEntry {
            employee_id: self.employee_id,
            date: date_from_stored(&self.work_date)?,
            status,
            hours_worked: self.hours_worked,
        })
    }
}
