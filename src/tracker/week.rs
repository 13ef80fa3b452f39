//! The fixed seven-slot week used by running tasks.
//!
//! Days are `chrono::Weekday` values indexed Monday-first (`0..=6`).
//! A [`Schedule`] is the recurring template of which days a task runs on;
//! a [`WeekGrid`] is the current week's per-day status derived from it.

use crate::error::{TrackerError, TrackerResult};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Monday-first week.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Per-day status of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Pending,
    Completed,
    Partial,
    Cancelled,
    Postponed,
}

impl DayStatus {
    pub const ALL: [DayStatus; 5] = [
        DayStatus::Pending,
        DayStatus::Completed,
        DayStatus::Partial,
        DayStatus::Cancelled,
        DayStatus::Postponed,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            DayStatus::Pending => "⬜",
            DayStatus::Completed => "✅",
            DayStatus::Partial => "🔳",
            DayStatus::Cancelled => "❌",
            DayStatus::Postponed => "➡️",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Pending => "pending",
            DayStatus::Completed => "completed",
            DayStatus::Partial => "partial",
            DayStatus::Cancelled => "cancelled",
            DayStatus::Postponed => "postponed",
        }
    }

    fn code(self) -> char {
        match self {
            DayStatus::Pending => 'p',
            DayStatus::Completed => 'c',
            DayStatus::Partial => 'h',
            DayStatus::Cancelled => 'x',
            DayStatus::Postponed => 'm',
        }
    }

    fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Whether the day still needs attention.
    pub fn is_open(self) -> bool {
        matches!(self, DayStatus::Pending | DayStatus::Partial)
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "reset" | "todo" => Ok(DayStatus::Pending),
            "completed" | "complete" | "done" => Ok(DayStatus::Completed),
            "partial" | "half" => Ok(DayStatus::Partial),
            "cancelled" | "canceled" | "cancel" | "skip" => Ok(DayStatus::Cancelled),
            "postponed" | "postpone" | "moved" | "move" => Ok(DayStatus::Postponed),
            _ => Err(TrackerError::InvalidStatus(s.trim().to_string())),
        }
    }
}

/// Monday-first index of a weekday.
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// Weekday for a Monday-first index, wrapping past Sunday.
pub fn day_at(index: usize) -> Weekday {
    WEEK[index % 7]
}

/// Two-letter column label.
pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

/// Parses one day: `1`-`7`, English names or abbreviations, or Russian
/// two-letter abbreviations.
pub fn parse_weekday(input: &str) -> TrackerResult<Weekday> {
    let token = input.trim().to_lowercase();
    if let Ok(n) = token.parse::<usize>() {
        return match n {
            1..=7 => Ok(WEEK[n - 1]),
            _ => Err(TrackerError::InvalidDay(token)),
        };
    }

    let russian = match token.as_str() {
        "пн" | "понедельник" => Some(Weekday::Mon),
        "вт" | "вторник" => Some(Weekday::Tue),
        "ср" | "среда" => Some(Weekday::Wed),
        "чт" | "четверг" => Some(Weekday::Thu),
        "пт" | "пятница" => Some(Weekday::Fri),
        "сб" | "суббота" => Some(Weekday::Sat),
        "вс" | "воскресенье" => Some(Weekday::Sun),
        _ => None,
    };
    if let Some(day) = russian {
        return Ok(day);
    }

    match token.as_str() {
        "mo" => Ok(Weekday::Mon),
        "tu" => Ok(Weekday::Tue),
        "we" => Ok(Weekday::Wed),
        "th" => Ok(Weekday::Thu),
        "fr" => Ok(Weekday::Fri),
        "sa" => Ok(Weekday::Sat),
        "su" => Ok(Weekday::Sun),
        _ => token
            .parse::<Weekday>()
            .map_err(|_| TrackerError::InvalidDay(input.trim().to_string())),
    }
}

/// Parses a day list such as `mon,wed,fri`, `1 3 5`, `mon-fri`, `daily`,
/// `weekdays` or `weekend`. The result is in week order without duplicates
/// and never empty.
pub fn parse_weekdays(input: &str) -> TrackerResult<Vec<Weekday>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TrackerError::InvalidDay(String::new()));
    }

    let mut selected = [false; 7];
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.to_lowercase().as_str() {
            "daily" | "all" | "everyday" | "ежедневно" => selected = [true; 7],
            "weekdays" | "workdays" | "будни" => {
                for flag in selected.iter_mut().take(5) {
                    *flag = true;
                }
            }
            "weekend" | "weekends" | "выходные" => {
                selected[5] = true;
                selected[6] = true;
            }
            _ => {
                if let Some((from, to)) = token.split_once('-') {
                    let from = day_index(parse_weekday(from)?);
                    let to = day_index(parse_weekday(to)?);
                    let span = (to + 7 - from) % 7;
                    for offset in 0..=span {
                        selected[(from + offset) % 7] = true;
                    }
                } else {
                    selected[day_index(parse_weekday(token)?)] = true;
                }
            }
        }
    }

    if selected.iter().all(|on| !on) {
        return Err(TrackerError::InvalidDay(input.to_string()));
    }

    Ok(WEEK
        .into_iter()
        .zip(selected)
        .filter_map(|(day, on)| on.then_some(day))
        .collect())
}

/// Recurring template: which days of every week a task runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule([bool; 7]);

impl Schedule {
    pub fn from_days(days: &[Weekday]) -> Self {
        let mut slots = [false; 7];
        for day in days {
            slots[day_index(*day)] = true;
        }
        Self(slots)
    }

    pub fn is_set(&self, day: Weekday) -> bool {
        self.0[day_index(day)]
    }

    /// Flips the day and returns the new state.
    pub fn toggle(&mut self, day: Weekday) -> bool {
        let slot = &mut self.0[day_index(day)];
        *slot = !*slot;
        *slot
    }

    pub fn days(&self) -> Vec<Weekday> {
        WEEK.into_iter().filter(|day| self.is_set(*day)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|on| !on)
    }

    /// Seven `0`/`1` characters, Monday first.
    pub fn encode(&self) -> String {
        self.0.iter().map(|on| if *on { '1' } else { '0' }).collect()
    }

    pub fn decode(code: &str) -> TrackerResult<Self> {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() != 7 {
            return Err(TrackerError::CorruptRecord(format!("schedule '{code}'")));
        }
        let mut slots = [false; 7];
        for (slot, c) in slots.iter_mut().zip(chars) {
            *slot = match c {
                '1' => true,
                '0' => false,
                _ => return Err(TrackerError::CorruptRecord(format!("schedule '{code}'"))),
            };
        }
        Ok(Self(slots))
    }

    /// Comma separated day labels, or `none`.
    pub fn describe(&self) -> String {
        let days = self.days();
        if days.is_empty() {
            return "none".to_string();
        }
        if days.len() == 7 {
            return "daily".to_string();
        }
        days.into_iter().map(day_label).collect::<Vec<_>>().join(", ")
    }
}

/// The current week: `None` where the task is off, otherwise its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekGrid([Option<DayStatus>; 7]);

impl WeekGrid {
    /// Fresh week where every scheduled day is pending.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut cells = [None; 7];
        for (cell, day) in cells.iter_mut().zip(WEEK) {
            if schedule.is_set(day) {
                *cell = Some(DayStatus::Pending);
            }
        }
        Self(cells)
    }

    pub fn get(&self, day: Weekday) -> Option<DayStatus> {
        self.0[day_index(day)]
    }

    pub fn set(&mut self, day: Weekday, status: Option<DayStatus>) {
        self.0[day_index(day)] = status;
    }

    pub fn is_scheduled(&self, day: Weekday) -> bool {
        self.get(day).is_some()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Weekday, Option<DayStatus>)> + '_ {
        WEEK.into_iter().zip(self.0.iter().copied())
    }

    pub fn scheduled_days(&self) -> Vec<Weekday> {
        self.cells().filter_map(|(day, cell)| cell.map(|_| day)).collect()
    }

    /// Seven status codes, `-` for off days.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|cell| cell.map_or('-', DayStatus::code))
            .collect()
    }

    pub fn decode(code: &str) -> TrackerResult<Self> {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() != 7 {
            return Err(TrackerError::CorruptRecord(format!("week grid '{code}'")));
        }
        let mut cells = [None; 7];
        for (cell, c) in cells.iter_mut().zip(chars) {
            *cell = match c {
                '-' => None,
                other => Some(DayStatus::from_code(other).ok_or_else(|| {
                    TrackerError::CorruptRecord(format!("week grid '{code}'"))
                })?),
            };
        }
        Ok(Self(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_days() {
        assert_eq!(parse_weekday("1").ok(), Some(Weekday::Mon));
        assert_eq!(parse_weekday("7").ok(), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Wed").ok(), Some(Weekday::Wed));
        assert_eq!(parse_weekday("friday").ok(), Some(Weekday::Fri));
        assert_eq!(parse_weekday("Сб").ok(), Some(Weekday::Sat));
        assert_eq!(parse_weekday("tu").ok(), Some(Weekday::Tue));
        assert!(parse_weekday("0").is_err());
        assert!(parse_weekday("8").is_err());
        assert!(parse_weekday("someday").is_err());
    }

    #[test]
    fn test_parse_day_lists() {
        assert_eq!(
            parse_weekdays("fri, mon 3").ok(),
            Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );
        assert_eq!(parse_weekdays("daily").map(|d| d.len()).ok(), Some(7));
        assert_eq!(
            parse_weekdays("weekend").ok(),
            Some(vec![Weekday::Sat, Weekday::Sun])
        );
        assert_eq!(parse_weekdays("mon-fri").ok(), parse_weekdays("weekdays").ok());
        assert!(parse_weekdays("").is_err());
        assert!(parse_weekdays("mon,funday").is_err());
    }

    #[test]
    fn test_day_list_without_days_is_rejected() {
        for input in [",", " , ", ",,\t,", "none"] {
            assert!(
                matches!(parse_weekdays(input), Err(TrackerError::InvalidDay(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_day_range_wraps_over_sunday() {
        assert_eq!(
            parse_weekdays("sat-mon").ok(),
            Some(vec![Weekday::Mon, Weekday::Sat, Weekday::Sun])
        );
    }

    #[test]
    fn test_duplicate_days_collapse() {
        assert_eq!(parse_weekdays("1,mon,пн").ok(), Some(vec![Weekday::Mon]));
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!("done".parse::<DayStatus>().ok(), Some(DayStatus::Completed));
        assert_eq!("half".parse::<DayStatus>().ok(), Some(DayStatus::Partial));
        assert_eq!("moved".parse::<DayStatus>().ok(), Some(DayStatus::Postponed));
        assert_eq!("Skip".parse::<DayStatus>().ok(), Some(DayStatus::Cancelled));
        assert!("finished?".parse::<DayStatus>().is_err());
    }

    #[test]
    fn test_schedule_toggle_and_describe() {
        let mut schedule = Schedule::from_days(&[Weekday::Mon, Weekday::Thu]);
        assert_eq!(schedule.encode(), "1001000");
        assert_eq!(schedule.describe(), "Mo, Th");

        assert!(!schedule.toggle(Weekday::Mon));
        assert!(schedule.toggle(Weekday::Sun));
        assert_eq!(schedule.days(), vec![Weekday::Thu, Weekday::Sun]);
        assert_eq!(Schedule::default().describe(), "none");
    }

    #[test]
    fn test_grid_follows_schedule() {
        let schedule = Schedule::from_days(&[Weekday::Tue, Weekday::Sat]);
        let grid = WeekGrid::from_schedule(&schedule);
        assert_eq!(grid.get(Weekday::Tue), Some(DayStatus::Pending));
        assert_eq!(grid.get(Weekday::Mon), None);
        assert_eq!(grid.scheduled_days(), vec![Weekday::Tue, Weekday::Sat]);
        assert_eq!(grid.encode(), "-p---p-");
    }

    #[test]
    fn test_grid_decode_rejects_garbage() {
        assert!(WeekGrid::decode("p-c-h-x").is_ok());
        assert!(WeekGrid::decode("p-c").is_err());
        assert!(WeekGrid::decode("p-c-h-z").is_err());
        assert!(Schedule::decode("1010102").is_err());
    }

    #[test]
    fn test_day_at_wraps() {
        assert_eq!(day_at(6), Weekday::Sun);
        assert_eq!(day_at(7), Weekday::Mon);
        assert_eq!(day_index(Weekday::Sun), 6);
    }
}
