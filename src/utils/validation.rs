use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Weekday};

use crate::tracker::timesheet::{PayPeriod, WorkStatus};
use crate::tracker::week::{parse_weekday, parse_weekdays};
use crate::tracker::{DayStatus, Priority};
use crate::utils::datetime::parse_date;

pub const DEFAULT_REPORT_DAYS: i64 = 30;
pub const MAX_REPORT_DAYS: i64 = 365;

/// Parses a positive numeric id, naming `what` in the error.
pub fn parse_id(input: &str, what: &str) -> Result<i64> {
    let input = input.trim().trim_start_matches('#');
    if input.is_empty() {
        return Err(anyhow!("{} id is required", what));
    }
    match input.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(anyhow!("'{}' is not a valid {} id", input, what)),
    }
}

fn split_args(input: &str) -> Vec<&str> {
    input.split_whitespace().collect()
}

/// `/add <priority> <days> <description>`. Days must be a single token
/// such as `mon,wed` or `mon-fri`.
pub fn parse_task_input(input: &str) -> Result<(Priority, Vec<Weekday>, String)> {
    let mut parts = input.trim().splitn(3, char::is_whitespace);
    let (Some(priority), Some(days), Some(description)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(anyhow!("Expected: <priority> <days> <description>"));
    };

    let priority: Priority = priority.parse()?;
    let days = parse_weekdays(days)?;
    let description = description.trim();
    if description.is_empty() {
        return Err(anyhow!("Task description cannot be empty"));
    }
    if description.contains('\n') {
        return Err(anyhow!("Task description cannot contain line breaks"));
    }

    Ok((priority, days, description.to_string()))
}

/// `/mark <id> <day> <status>`.
pub fn parse_mark_args(input: &str) -> Result<(i64, Weekday, DayStatus)> {
    match split_args(input).as_slice() {
        [id, day, status] => Ok((parse_id(id, "task")?, parse_weekday(day)?, status.parse()?)),
        _ => Err(anyhow!("Expected: <task id> <day> <status>")),
    }
}

/// `/toggle <id> <day>`.
pub fn parse_toggle_args(input: &str) -> Result<(i64, Weekday)> {
    match split_args(input).as_slice() {
        [id, day] => Ok((parse_id(id, "task")?, parse_weekday(day)?)),
        _ => Err(anyhow!("Expected: <task id> <day>")),
    }
}

/// `<id> <free text>`, used by `/comment` and `/addperson`.
pub fn parse_id_and_text(input: &str, what: &str) -> Result<(i64, String)> {
    let input = input.trim();
    let (id, rest) = input
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("Expected: <{} id> <text>", what))?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(anyhow!("Text after the {} id cannot be empty", what));
    }
    Ok((parse_id(id, what)?, rest.to_string()))
}

/// `/attend <employee id> <status> [date]`; the date defaults to today.
pub fn parse_attend_args(input: &str) -> Result<(i64, WorkStatus, Option<NaiveDate>)> {
    match split_args(input).as_slice() {
        [id, status] => Ok((parse_id(id, "employee")?, status.parse()?, None)),
        [id, status, date] => Ok((
            parse_id(id, "employee")?,
            status.parse()?,
            Some(parse_date(date)?),
        )),
        _ => Err(anyhow!("Expected: <employee id> <status> [YYYY-MM-DD]")),
    }
}

/// `/removeperson <object id> <n>` where `n` is the 1-based list position.
pub fn parse_person_position(input: &str) -> Result<(i64, usize)> {
    match split_args(input).as_slice() {
        [id, position] => {
            let position = position
                .parse::<usize>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| anyhow!("'{}' is not a list position", position))?;
            Ok((parse_id(id, "object")?, position))
        }
        _ => Err(anyhow!("Expected: <object id> <person number>")),
    }
}

/// Report window in days; blank means the default.
pub fn parse_report_days(input: &str) -> Result<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_REPORT_DAYS);
    }
    match input.parse::<i64>() {
        Ok(days) if (1..=MAX_REPORT_DAYS).contains(&days) => Ok(days),
        _ => Err(anyhow!("Report period must be 1-{} days", MAX_REPORT_DAYS)),
    }
}

/// `/salary` argument: blank for the current half-month, `prev` for the
/// previous one, or any date inside the wanted period.
pub fn parse_pay_period(input: &str, today: NaiveDate) -> Result<PayPeriod> {
    let input = input.trim();
    let current = PayPeriod::containing(today);
    match input.to_lowercase().as_str() {
        "" | "current" => Ok(current),
        "prev" | "previous" | "last" => Ok(current.previous()),
        _ => Ok(PayPeriod::containing(parse_date(input)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12", "task").ok(), Some(12));
        assert_eq!(parse_id(" #7 ", "task").ok(), Some(7));
        assert!(parse_id("0", "task").is_err());
        assert!(parse_id("-3", "task").is_err());
        assert!(parse_id("abc", "task").is_err());
        assert!(parse_id("", "task").is_err());
    }

    #[test]
    fn test_parse_task_input() {
        let (priority, days, description) =
            parse_task_input("high mon,wed Call the supplier about bricks").expect("valid input");
        assert_eq!(priority, Priority::High);
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(description, "Call the supplier about bricks");
    }

    #[test]
    fn test_parse_task_input_rejects_missing_parts() {
        assert!(parse_task_input("high mon").is_err());
        assert!(parse_task_input("").is_err());
        assert!(parse_task_input("extreme mon Task").is_err());
        assert!(parse_task_input("low someday Task").is_err());
        assert!(parse_task_input("high , Foo").is_err());
    }

    #[test]
    fn test_parse_mark_and_toggle_args() {
        let (id, day, status) = parse_mark_args("3 fri done").expect("valid mark");
        assert_eq!((id, day, status), (3, Weekday::Fri, DayStatus::Completed));
        assert!(parse_mark_args("3 fri").is_err());
        assert!(parse_mark_args("3 fri finished").is_err());

        assert_eq!(parse_toggle_args("5 7").ok(), Some((5, Weekday::Sun)));
        assert!(parse_toggle_args("5").is_err());
    }

    #[test]
    fn test_parse_id_and_text() {
        let (id, text) = parse_id_and_text("4 Formwork accepted, minor cracks", "object")
            .expect("valid comment");
        assert_eq!(id, 4);
        assert_eq!(text, "Formwork accepted, minor cracks");
        assert!(parse_id_and_text("4", "object").is_err());
        assert!(parse_id_and_text("x text", "object").is_err());
    }

    #[test]
    fn test_parse_attend_args() {
        let (id, status, date) = parse_attend_args("2 sick 2024-03-05").expect("valid attend");
        assert_eq!(id, 2);
        assert_eq!(status, WorkStatus::Sick);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5));

        let (_, status, date) = parse_attend_args("2 worked").expect("valid attend");
        assert_eq!(status, WorkStatus::Worked);
        assert!(date.is_none());

        assert!(parse_attend_args("2 sleeping").is_err());
    }

    #[test]
    fn test_parse_person_position() {
        assert_eq!(parse_person_position("3 2").ok(), Some((3, 2)));
        assert!(parse_person_position("3 0").is_err());
        assert!(parse_person_position("3").is_err());
    }

    #[test]
    fn test_parse_report_days() {
        assert_eq!(parse_report_days("").ok(), Some(DEFAULT_REPORT_DAYS));
        assert_eq!(parse_report_days("7").ok(), Some(7));
        assert!(parse_report_days("0").is_err());
        assert!(parse_report_days("400").is_err());
    }

    #[test]
    fn test_parse_pay_period() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).expect("valid date");
        let current = parse_pay_period("", today).expect("current period");
        assert_eq!(current.start, NaiveDate::from_ymd_opt(2024, 3, 16).expect("valid date"));

        let previous = parse_pay_period("prev", today).expect("previous period");
        assert_eq!(previous.start, NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"));
        assert_eq!(previous.end, NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"));

        let by_date = parse_pay_period("10.02.2024", today).expect("period by date");
        assert_eq!(by_date.end, NaiveDate::from_ymd_opt(2024, 2, 15).expect("valid date"));
    }
}
