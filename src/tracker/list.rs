use crate::tracker::priority::Priority;
use crate::tracker::task::RunningTask;
use crate::tracker::week::{day_label, DayStatus, WEEK};
use chrono::Weekday;

/// A user's running list as loaded from storage.
#[derive(Debug, Clone, Default)]
pub struct RunningList {
    pub user_id: i64,
    tasks: Vec<RunningTask>,
}

/// Counts over the current week of every active task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekStats {
    pub active_tasks: usize,
    pub archived_tasks: usize,
    pub scheduled_slots: usize,
    pub pending: usize,
    pub completed: usize,
    pub partial: usize,
    pub cancelled: usize,
}

impl WeekStats {
    /// Share of scheduled slots that are completed, in percent.
    pub fn completion_rate(&self) -> f64 {
        if self.scheduled_slots == 0 {
            return 0.0;
        }
        self.completed as f64 / self.scheduled_slots as f64 * 100.0
    }
}

impl RunningList {
    pub fn new(user_id: i64, tasks: Vec<RunningTask>) -> Self {
        Self { user_id, tasks }
    }

    pub fn tasks(&self) -> &[RunningTask] {
        &self.tasks
    }

    pub fn get(&self, task_id: i64) -> Option<&RunningTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn active(&self) -> Vec<&RunningTask> {
        self.tasks.iter().filter(|t| !t.is_archived()).collect()
    }

    pub fn completed(&self) -> Vec<&RunningTask> {
        self.tasks.iter().filter(|t| t.is_archived()).collect()
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<&RunningTask> {
        self.tasks
            .iter()
            .filter(|t| !t.is_archived() && t.priority == priority)
            .collect()
    }

    /// Active tasks that still need doing on `day`, most urgent first.
    pub fn scheduled_on(&self, day: Weekday) -> Vec<&RunningTask> {
        let mut tasks: Vec<&RunningTask> = self
            .tasks
            .iter()
            .filter(|t| !t.is_archived() && t.open_on(day).is_some())
            .collect();
        sort_for_board(&mut tasks);
        tasks
    }

    pub fn week_stats(&self) -> WeekStats {
        let mut stats = WeekStats::default();
        for task in &self.tasks {
            if task.is_archived() {
                stats.archived_tasks += 1;
                continue;
            }
            stats.active_tasks += 1;
            for (_, cell) in task.week.cells() {
                let Some(status) = cell else { continue };
                stats.scheduled_slots += 1;
                match status {
                    DayStatus::Pending => stats.pending += 1,
                    DayStatus::Completed => stats.completed += 1,
                    DayStatus::Partial => stats.partial += 1,
                    DayStatus::Cancelled => stats.cancelled += 1,
                    DayStatus::Postponed => {}
                }
            }
        }
        stats
    }

    /// The weekly board: day header, one row per active task, legend.
    pub fn render_board(&self, today: Weekday) -> String {
        let mut tasks = self.active();
        if tasks.is_empty() {
            return "📭 Running list is empty.\nAdd a task with /newtask or /add".to_string();
        }
        sort_for_board(&mut tasks);

        let header = WEEK
            .into_iter()
            .map(|day| {
                if day == today {
                    format!("[{}]", day_label(day))
                } else {
                    day_label(day).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let width = tasks
            .iter()
            .map(|t| t.description.chars().count())
            .max()
            .unwrap_or(0);

        let mut text = format!("📅 Running list for the week\n{header}\n\n");
        for task in tasks {
            text.push_str(&format!(
                "{} - {:<width$} [#{}]\n",
                task.week_display(),
                task.description,
                task.id,
            ));
        }
        text.push('\n');
        text.push_str(&legend());
        text
    }

    /// Archived tasks with their completion time.
    pub fn render_archive(&self) -> String {
        let done = self.completed();
        if done.is_empty() {
            return "🗄 No archived tasks".to_string();
        }
        let mut text = String::from("🗄 Archived tasks\n\n");
        for task in done {
            let when = task
                .completed_at
                .map(|at| at.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_default();
            text.push_str(&format!(
                "#{} {}\n   {} | ✅ {}\n",
                task.id,
                task.description,
                task.priority.emoji(),
                when
            ));
        }
        text.push_str("\nUse /reopen <id> to bring a task back");
        text
    }
}

fn sort_for_board(tasks: &mut [&RunningTask]) {
    tasks.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
}

pub fn legend() -> String {
    let priorities = Priority::ALL
        .iter()
        .map(|p| format!("{} {}", p.emoji(), p.as_str()))
        .collect::<Vec<_>>()
        .join("  ");
    format!(
        "Legend:\n{priorities}\n✅ done  🔳 partial  ❌ cancelled  ⬜ off\n{} postponed tasks move to the next day",
        DayStatus::Postponed.emoji()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> RunningList {
        let mut archived = RunningTask::new(3, 7, "Old task", Priority::Urgent, &[Weekday::Mon]);
        assert!(archived.complete(Utc::now()).is_ok());
        RunningList::new(
            7,
            vec![
                RunningTask::new(1, 7, "Water plants", Priority::Low, &[Weekday::Mon, Weekday::Thu]),
                RunningTask::new(2, 7, "Pay rent", Priority::High, &[Weekday::Mon]),
                archived,
            ],
        )
    }

    #[test]
    fn test_active_and_completed_split() {
        let list = sample();
        assert_eq!(list.active().len(), 2);
        assert_eq!(list.completed().len(), 1);
        assert_eq!(list.by_priority(Priority::Urgent).len(), 0);
        assert_eq!(list.by_priority(Priority::Low).len(), 1);
        assert!(list.get(2).is_some());
        assert!(list.get(9).is_none());
    }

    #[test]
    fn test_board_sorted_by_priority_with_padding() {
        let board = sample().render_board(Weekday::Thu);
        let rows: Vec<&str> = board.lines().filter(|l| l.contains("[#")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Pay rent     [#2]"));
        assert!(rows[1].contains("Water plants [#1]"));
        assert!(board.contains("[Th]"));
        assert!(!board.contains("Old task"));
        assert!(board.contains("Legend"));
    }

    #[test]
    fn test_empty_board() {
        let board = RunningList::new(1, Vec::new()).render_board(Weekday::Mon);
        assert!(board.contains("empty"));
    }

    #[test]
    fn test_scheduled_on_skips_closed_days() {
        let mut list = sample();
        assert_eq!(list.scheduled_on(Weekday::Mon).len(), 2);
        assert_eq!(list.scheduled_on(Weekday::Mon)[0].id, 2);

        let mut tasks = list.tasks().to_vec();
        assert!(tasks[1].set_status(Weekday::Mon, DayStatus::Completed, Utc::now()).is_ok());
        list = RunningList::new(7, tasks);
        assert_eq!(list.scheduled_on(Weekday::Mon).len(), 1);
        assert!(list.scheduled_on(Weekday::Sun).is_empty());
    }

    #[test]
    fn test_week_stats() {
        let mut tasks = sample().tasks().to_vec();
        assert!(tasks[0].set_status(Weekday::Mon, DayStatus::Completed, Utc::now()).is_ok());
        assert!(tasks[1].set_status(Weekday::Mon, DayStatus::Cancelled, Utc::now()).is_ok());
        let stats = RunningList::new(7, tasks).week_stats();
        assert_eq!(stats.active_tasks, 2);
        assert_eq!(stats.archived_tasks, 1);
        assert_eq!(stats.scheduled_slots, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.pending, 1);
        assert!((stats.completion_rate() - 33.33).abs() < 0.1);
    }

    #[test]
    fn test_archive_rendering() {
        let text = sample().render_archive();
        assert!(text.contains("#3 Old task"));
        assert!(RunningList::new(1, Vec::new()).render_archive().contains("No archived"));
    }
}
