use crate::error::{TrackerError, TrackerResult};
use crate::tracker::priority::Priority;
use crate::tracker::week::{day_at, day_index, day_label, DayStatus, Schedule, WeekGrid};
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// How many history lines `details()` shows.
const DETAILS_HISTORY_TAIL: usize = 5;

/// One recorded status change. The history only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub day: Weekday,
    pub status: DayStatus,
    pub recorded_at: DateTime<Utc>,
}

/// A recurring task on a user's running list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTask {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub priority: Priority,
    pub schedule: Schedule,
    pub week: WeekGrid,
    history: Vec<StatusEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunningTask {
    pub fn new(
        id: i64,
        user_id: i64,
        description: impl Into<String>,
        priority: Priority,
        days: &[Weekday],
    ) -> Self {
        let schedule = Schedule::from_days(days);
        Self {
            id,
            user_id,
            description: description.into(),
            priority,
            schedule,
            week: WeekGrid::from_schedule(&schedule),
            history: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Rebuilds a task from stored parts. History must be in recording order.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: i64,
        user_id: i64,
        description: String,
        priority: Priority,
        schedule: Schedule,
        week: WeekGrid,
        history: Vec<StatusEntry>,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            user_id,
            description,
            priority,
            schedule,
            week,
            history,
            created_at,
            completed_at,
        }
    }

    pub fn history(&self) -> &[StatusEntry] {
        &self.history
    }

    pub fn is_archived(&self) -> bool {
        self.completed_at.is_some()
    }

    fn ensure_active(&self) -> TrackerResult<()> {
        if self.is_archived() {
            return Err(TrackerError::TaskArchived(self.id));
        }
        Ok(())
    }

    /// Adds or removes `day` from the recurring schedule and the current week.
    /// Returns whether the day is now scheduled.
    pub fn toggle_day(&mut self, day: Weekday) -> TrackerResult<bool> {
        self.ensure_active()?;
        let scheduled = self.schedule.toggle(day);
        self.week.set(day, scheduled.then_some(DayStatus::Pending));
        Ok(scheduled)
    }

    /// Records a status for `day` of the current week and returns the single
    /// history entry appended for it.
    ///
    /// Postponing clears `day` and schedules the following day (Sunday wraps
    /// to Monday). A following day that is already scheduled keeps its status.
    pub fn set_status(
        &mut self,
        day: Weekday,
        status: DayStatus,
        at: DateTime<Utc>,
    ) -> TrackerResult<StatusEntry> {
        self.ensure_active()?;
        if !self.week.is_scheduled(day) {
            return Err(TrackerError::DayNotScheduled(day));
        }

        match status {
            DayStatus::Postponed => {
                let next = day_at(day_index(day) + 1);
                self.week.set(day, None);
                if !self.week.is_scheduled(next) {
                    self.week.set(next, Some(DayStatus::Pending));
                }
            }
            other => self.week.set(day, Some(other)),
        }

        let entry = StatusEntry {
            day,
            status,
            recorded_at: at,
        };
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// Archives the task. Archived tasks keep their data and can be reopened.
    pub fn complete(&mut self, at: DateTime<Utc>) -> TrackerResult<()> {
        self.ensure_active()?;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Returns false when the task was not archived.
    pub fn reopen(&mut self) -> bool {
        self.completed_at.take().is_some()
    }

    /// Weekly rollover: the grid is rebuilt from the recurring schedule.
    pub fn start_new_week(&mut self) {
        self.week = WeekGrid::from_schedule(&self.schedule);
    }

    /// Status of `day` if it still needs doing.
    pub fn open_on(&self, day: Weekday) -> Option<DayStatus> {
        self.week.get(day).filter(|status| status.is_open())
    }

    /// One emoji per day: off, priority for pending, otherwise the status.
    pub fn week_display(&self) -> String {
        self.week
            .cells()
            .map(|(_, cell)| match cell {
                None => "⬜",
                Some(DayStatus::Pending) => self.priority.emoji(),
                Some(status) => status.emoji(),
            })
            .collect()
    }

    pub fn details(&self) -> String {
        let mut text = format!(
            "📋 Task #{}: {}\n🎯 Priority: {}\n🔁 Schedule: {}\n📅 This week: {}\n",
            self.id,
            self.description,
            self.priority,
            self.schedule.describe(),
            self.week_display(),
        );

        for (day, cell) in self.week.cells() {
            if let Some(status) = cell {
                text.push_str(&format!("  {}: {} {}\n", day_label(day), status.emoji(), status));
            }
        }

        if let Some(done) = self.completed_at {
            text.push_str(&format!("🗄 Archived {}\n", done.format("%d.%m.%Y %H:%M")));
        }

        if !self.history.is_empty() {
            text.push_str("🕘 Recent changes:\n");
            let skip = self.history.len().saturating_sub(DETAILS_HISTORY_TAIL);
            for entry in &self.history[skip..] {
                text.push_str(&format!(
                    "  {} {} {} ({})\n",
                    entry.recorded_at.format("%d.%m %H:%M"),
                    day_label(entry.day),
                    entry.status.emoji(),
                    entry.status
                ));
            }
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(days: &[Weekday]) -> RunningTask {
        RunningTask::new(1, 42, "Check the generator", Priority::High, days)
    }

    #[test]
    fn test_new_task_grid_matches_schedule() {
        let task = task(&[Weekday::Mon, Weekday::Wed]);
        assert_eq!(task.week.get(Weekday::Mon), Some(DayStatus::Pending));
        assert_eq!(task.week.get(Weekday::Tue), None);
        assert!(task.history().is_empty());
        assert_eq!(task.week_display(), "🟥⬜🟥⬜⬜⬜⬜");
    }

    #[test]
    fn test_status_change_appends_exactly_one_entry() {
        let mut task = task(&[Weekday::Mon]);
        let at = Utc::now();
        let entry = task.set_status(Weekday::Mon, DayStatus::Completed, at);
        assert!(entry.is_ok());
        assert_eq!(task.history().len(), 1);
        assert_eq!(task.history()[0].status, DayStatus::Completed);
        assert_eq!(task.history()[0].recorded_at, at);
        assert_eq!(task.week.get(Weekday::Mon), Some(DayStatus::Completed));
    }

    #[test]
    fn test_postpone_moves_to_next_day() {
        let mut task = task(&[Weekday::Tue]);
        assert!(task.set_status(Weekday::Tue, DayStatus::Postponed, Utc::now()).is_ok());
        assert_eq!(task.week.get(Weekday::Tue), None);
        assert_eq!(task.week.get(Weekday::Wed), Some(DayStatus::Pending));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.history().len(), 1);
        assert_eq!(task.history()[0].day, Weekday::Tue);
        assert!(task.schedule.is_set(Weekday::Tue));
        assert!(!task.schedule.is_set(Weekday::Wed));
    }

    #[test]
    fn test_postpone_sunday_wraps_to_monday() {
        let mut task = task(&[Weekday::Sun]);
        assert!(task.set_status(Weekday::Sun, DayStatus::Postponed, Utc::now()).is_ok());
        assert_eq!(task.week.get(Weekday::Sun), None);
        assert_eq!(task.week.get(Weekday::Mon), Some(DayStatus::Pending));
    }

    #[test]
    fn test_postpone_onto_scheduled_day_keeps_its_status() {
        let mut task = task(&[Weekday::Thu, Weekday::Fri]);
        assert!(task.set_status(Weekday::Fri, DayStatus::Partial, Utc::now()).is_ok());
        assert!(task.set_status(Weekday::Thu, DayStatus::Postponed, Utc::now()).is_ok());
        assert_eq!(task.week.get(Weekday::Thu), None);
        assert_eq!(task.week.get(Weekday::Fri), Some(DayStatus::Partial));
        assert_eq!(task.history().len(), 2);
    }

    #[test]
    fn test_unscheduled_day_is_rejected_without_history() {
        let mut task = task(&[Weekday::Mon]);
        let result = task.set_status(Weekday::Sat, DayStatus::Completed, Utc::now());
        assert!(matches!(result, Err(TrackerError::DayNotScheduled(Weekday::Sat))));
        assert!(task.history().is_empty());
    }

    #[test]
    fn test_archived_task_rejects_changes() {
        let mut task = task(&[Weekday::Mon]);
        assert!(task.complete(Utc::now()).is_ok());
        assert!(task.is_archived());
        assert!(matches!(
            task.set_status(Weekday::Mon, DayStatus::Completed, Utc::now()),
            Err(TrackerError::TaskArchived(1))
        ));
        assert!(task.toggle_day(Weekday::Tue).is_err());
        assert!(task.complete(Utc::now()).is_err());

        assert!(task.reopen());
        assert!(!task.reopen());
        assert!(task.set_status(Weekday::Mon, DayStatus::Completed, Utc::now()).is_ok());
    }

    #[test]
    fn test_toggle_day_updates_schedule_and_week() {
        let mut task = task(&[]);
        assert_eq!(task.toggle_day(Weekday::Fri).ok(), Some(true));
        assert_eq!(task.week.get(Weekday::Fri), Some(DayStatus::Pending));
        assert!(task.schedule.is_set(Weekday::Fri));

        assert_eq!(task.toggle_day(Weekday::Fri).ok(), Some(false));
        assert_eq!(task.week.get(Weekday::Fri), None);
        assert!(task.history().is_empty());
    }

    #[test]
    fn test_new_week_restores_schedule() {
        let mut task = task(&[Weekday::Mon, Weekday::Wed]);
        assert!(task.set_status(Weekday::Mon, DayStatus::Completed, Utc::now()).is_ok());
        assert!(task.set_status(Weekday::Wed, DayStatus::Postponed, Utc::now()).is_ok());

        task.start_new_week();
        assert_eq!(task.week.get(Weekday::Mon), Some(DayStatus::Pending));
        assert_eq!(task.week.get(Weekday::Wed), Some(DayStatus::Pending));
        assert_eq!(task.week.get(Weekday::Thu), None);
        assert_eq!(task.history().len(), 2);
    }

    #[test]
    fn test_display_marks_statuses() {
        let mut task = task(&[Weekday::Mon, Weekday::Tue, Weekday::Wed]);
        assert!(task.set_status(Weekday::Mon, DayStatus::Completed, Utc::now()).is_ok());
        assert!(task.set_status(Weekday::Tue, DayStatus::Cancelled, Utc::now()).is_ok());
        assert_eq!(task.week_display(), "✅❌🟥⬜⬜⬜⬜");
        assert_eq!(task.open_on(Weekday::Wed), Some(DayStatus::Pending));
        assert_eq!(task.open_on(Weekday::Mon), None);
    }

    #[test]
    fn test_details_lists_schedule_and_history() {
        let mut task = task(&[Weekday::Mon]);
        assert!(task.set_status(Weekday::Mon, DayStatus::Partial, Utc::now()).is_ok());
        let details = task.details();
        assert!(details.contains("Task #1: Check the generator"));
        assert!(details.contains("Schedule: Mo"));
        assert!(details.contains("Recent changes"));
        assert!(details.contains("partial"));
    }
}
