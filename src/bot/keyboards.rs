//! Inline keyboards and the callback data they carry.
//!
//! Callback data formats:
//! - `st:<task id>:<day 0-6>:<status>` sets a day status
//! - `prio:<priority>` answers the priority step of /newtask

use chrono::Weekday;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::tracker::week::{day_at, day_index};
use crate::tracker::{DayStatus, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Status {
        task_id: i64,
        day: Weekday,
        status: DayStatus,
    },
    Priority(Priority),
}

impl CallbackData {
    pub fn encode(&self) -> String {
        match self {
            CallbackData::Status {
                task_id,
                day,
                status,
            } => format!("st:{}:{}:{}", task_id, day_index(*day), status.as_str()),
            CallbackData::Priority(priority) => format!("prio:{}", priority.as_str()),
        }
    }

    /// None for anything malformed; stale buttons are simply ignored.
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.split(':');
        match (parts.next()?, parts.next(), parts.next(), parts.next(), parts.next()) {
            ("st", Some(task), Some(day), Some(status), None) => {
                let task_id = task.parse::<i64>().ok().filter(|id| *id > 0)?;
                let day = day.parse::<usize>().ok().filter(|d| *d < 7)?;
                Some(CallbackData::Status {
                    task_id,
                    day: day_at(day),
                    status: status.parse().ok()?,
                })
            }
            ("prio", Some(priority), None, None, None) => {
                priority.parse().ok().map(CallbackData::Priority)
            }
            _ => None,
        }
    }
}

pub fn priority_keyboard() -> InlineKeyboardMarkup {
    let buttons = Priority::ALL
        .iter()
        .map(|priority| {
            InlineKeyboardButton::callback(
                priority.to_string(),
                CallbackData::Priority(*priority).encode(),
            )
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons.chunks(2).map(|row| row.to_vec()))
}

/// Status buttons for one day of a task. Pending acts as a reset.
pub fn status_keyboard(task_id: i64, day: Weekday) -> InlineKeyboardMarkup {
    let button = |status: DayStatus, label: &str| {
        InlineKeyboardButton::callback(
            format!("{} {}", status.emoji(), label),
            CallbackData::Status {
                task_id,
                day,
                status,
            }
            .encode(),
        )
    };

    InlineKeyboardMarkup::new(vec![
        vec![
            button(DayStatus::Completed, "Done"),
            button(DayStatus::Partial, "Partial"),
        ],
        vec![
            button(DayStatus::Cancelled, "Cancel"),
            button(DayStatus::Postponed, "Postpone"),
        ],
        vec![button(DayStatus::Pending, "Reset")],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_callback_data() {
        let data = CallbackData::Status {
            task_id: 42,
            day: Weekday::Sun,
            status: DayStatus::Postponed,
        };
        assert_eq!(data.encode(), "st:42:6:postponed");
        assert_eq!(CallbackData::parse("st:42:6:postponed"), Some(data));
    }

    #[test]
    fn test_priority_callback_data() {
        assert_eq!(
            CallbackData::parse("prio:urgent"),
            Some(CallbackData::Priority(Priority::Urgent))
        );
        assert_eq!(CallbackData::Priority(Priority::Low).encode(), "prio:low");
    }

    #[test]
    fn test_malformed_callback_data() {
        assert_eq!(CallbackData::parse(""), None);
        assert_eq!(CallbackData::parse("st:42:7:done"), None);
        assert_eq!(CallbackData::parse("st:0:1:done"), None);
        assert_eq!(CallbackData::parse("st:42:1:maybe"), None);
        assert_eq!(CallbackData::parse("st:42:1:done:extra"), None);
        assert_eq!(CallbackData::parse("prio:"), None);
        assert_eq!(CallbackData::parse("session:1:yes"), None);
    }

    #[test]
    fn test_status_keyboard_fits_callback_limit() {
        let keyboard = status_keyboard(i64::MAX, Weekday::Wed);
        for row in &keyboard.inline_keyboard {
            for button in row {
                if let teloxide::types::InlineKeyboardButtonKind::CallbackData(data) = &button.kind {
                    assert!(data.len() <= 64);
                    assert!(CallbackData::parse(data).is_some());
                }
            }
        }
    }
}
