use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard working day in hours.
pub const DEFAULT_HOURS: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub position: String,
    pub daily_salary: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Worked,
    Absent,
    Sick,
    Vacation,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 4] = [
        WorkStatus::Worked,
        WorkStatus::Absent,
        WorkStatus::Sick,
        WorkStatus::Vacation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkStatus::Worked => "worked",
            WorkStatus::Absent => "absent",
            WorkStatus::Sick => "sick",
            WorkStatus::Vacation => "vacation",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            WorkStatus::Worked => "✅",
            WorkStatus::Absent => "❌",
            WorkStatus::Sick => "🤒",
            WorkStatus::Vacation => "🏖",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "worked" | "work" | "present" | "yes" | "+" => Ok(WorkStatus::Worked),
            "absent" | "no" | "-" => Ok(WorkStatus::Absent),
            "sick" | "ill" => Ok(WorkStatus::Sick),
            "vacation" | "holiday" | "leave" => Ok(WorkStatus::Vacation),
            other => Err(TrackerError::InvalidInput(format!(
                "Unknown attendance status '{other}'. Use worked, absent, sick or vacation"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: WorkStatus,
    pub hours_worked: f64,
}

impl TimesheetEntry {
    pub fn new(employee_id: i64, date: NaiveDate, status: WorkStatus) -> Self {
        let hours_worked = if status == WorkStatus::Worked { DEFAULT_HOURS } else { 0.0 };
        Self {
            employee_id,
            date,
            status,
            hours_worked,
        }
    }
}

/// Half-month salary period: the 1st to the 15th, or the 16th to month end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    pub fn containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        if date.day() <= 15 {
            Self {
                start: first,
                end: first + Duration::days(14),
            }
        } else {
            Self {
                start: first + Duration::days(15),
                end: last_day_of_month(date),
            }
        }
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start - Duration::days(1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn label(&self) -> String {
        format!(
            "{}-{} {}",
            self.start.day(),
            self.end.day(),
            self.start.format("%B %Y")
        )
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next - Duration::days(1))
        .unwrap_or(date)
}

/// Attendance for one employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timesheet {
    pub employee_id: i64,
    entries: Vec<TimesheetEntry>,
}

impl Timesheet {
    pub fn new(employee_id: i64, entries: Vec<TimesheetEntry>) -> Self {
        let mut sheet = Self {
            employee_id,
            entries: Vec::new(),
        };
        for entry in entries {
            sheet.record(entry);
        }
        sheet
    }

    /// Adds an entry, replacing any entry for the same date.
    pub fn record(&mut self, entry: TimesheetEntry) {
        self.entries.retain(|e| e.date != entry.date);
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.date);
    }

    pub fn entries(&self) -> &[TimesheetEntry] {
        &self.entries
    }

    /// Entries with `start <= date <= end`.
    pub fn entries_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&TimesheetEntry> {
        self.entries
            .iter()
            .filter(|e| start <= e.date && e.date <= end)
            .collect()
    }

    pub fn is_marked(&self, date: NaiveDate) -> bool {
        self.entries.iter().any(|e| e.date == date)
    }

    pub fn status_on(&self, date: NaiveDate) -> Option<WorkStatus> {
        self.entries.iter().find(|e| e.date == date).map(|e| e.status)
    }

    pub fn count(&self, status: WorkStatus, period: &PayPeriod) -> usize {
        self.entries_between(period.start, period.end)
            .into_iter()
            .filter(|e| e.status == status)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryLine {
    pub employee_name: String,
    pub position: String,
    pub daily_salary: f64,
    pub worked_days: usize,
    pub absent_days: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryReport {
    pub period: PayPeriod,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<SalaryLine>,
}

impl SalaryReport {
    pub fn new(period: PayPeriod, generated_at: DateTime<Utc>) -> Self {
        Self {
            period,
            generated_at,
            lines: Vec::new(),
        }
    }

    /// Pays `daily_salary` for every worked day in the period.
    pub fn add_employee(&mut self, employee: &Employee, sheet: &Timesheet) -> &SalaryLine {
        let worked_days = sheet.count(WorkStatus::Worked, &self.period);
        self.lines.push(SalaryLine {
            employee_name: employee.name.clone(),
            position: employee.position.clone(),
            daily_salary: employee.daily_salary,
            worked_days,
            absent_days: sheet.count(WorkStatus::Absent, &self.period),
            sick_days: sheet.count(WorkStatus::Sick, &self.period),
            vacation_days: sheet.count(WorkStatus::Vacation, &self.period),
            total: worked_days as f64 * employee.daily_salary,
        });
        &self.lines[self.lines.len() - 1]
    }

    pub fn total_payroll(&self) -> f64 {
        self.lines.iter().map(|l| l.total).sum()
    }

    pub fn render(&self) -> String {
        let mut text = format!("💰 Salary for {}\n\n", self.period.label());
        if self.lines.is_empty() {
            text.push_str("No employees on the timesheet");
            return text;
        }
        for (i, line) in self.lines.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} ({})\n   ✅ {} worked  ❌ {}  🤒 {}  🏖 {}\n   📊 {:.2}/day → 💰 {:.2}\n",
                i + 1,
                line.employee_name,
                line.position,
                line.worked_days,
                line.absent_days,
                line.sick_days,
                line.vacation_days,
                line.daily_salary,
                line.total
            ));
        }
        text.push_str(&format!("\nTotal payroll: {:.2}", self.total_payroll()));
        text
    }
}

/// Parses `Name;Position;DailySalary`.
pub fn parse_employee_input(input: &str) -> TrackerResult<(String, String, f64)> {
    let parts: Vec<&str> = input.split(';').map(str::trim).collect();
    let [name, position, salary] = parts.as_slice() else {
        return Err(TrackerError::InvalidInput(
            "Use the format Name;Position;DailySalary".to_string(),
        ));
    };
    if name.is_empty() || position.is_empty() {
        return Err(TrackerError::InvalidInput(
            "Name and position cannot be empty".to_string(),
        ));
    }
    let salary: f64 = salary
        .replace(',', ".")
        .parse()
        .map_err(|_| TrackerError::InvalidInput(format!("'{salary}' is not a number")))?;
    if !salary.is_finite() || salary <= 0.0 {
        return Err(TrackerError::InvalidInput(
            "Daily salary must be greater than zero".to_string(),
        ));
    }
    Ok((name.to_string(), position.to_string(), salary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_pay_periods() {
        let first = PayPeriod::containing(date(2024, 2, 10));
        assert_eq!(first.start, date(2024, 2, 1));
        assert_eq!(first.end, date(2024, 2, 15));

        let second = PayPeriod::containing(date(2024, 2, 16));
        assert_eq!(second.start, date(2024, 2, 16));
        assert_eq!(second.end, date(2024, 2, 29));

        let december = PayPeriod::containing(date(2023, 12, 31));
        assert_eq!(december.end, date(2023, 12, 31));

        assert_eq!(first.previous().start, date(2024, 1, 16));
        assert_eq!(first.previous().end, date(2024, 1, 31));
        assert_eq!(second.previous(), first);
        assert_eq!(first.label(), "1-15 February 2024");
    }

    #[test]
    fn test_record_replaces_same_date() {
        let mut sheet = Timesheet::new(1, Vec::new());
        sheet.record(TimesheetEntry::new(1, date(2024, 3, 4), WorkStatus::Absent));
        sheet.record(TimesheetEntry::new(1, date(2024, 3, 4), WorkStatus::Worked));
        sheet.record(TimesheetEntry::new(1, date(2024, 3, 1), WorkStatus::Sick));
        assert_eq!(sheet.entries().len(), 2);
        assert_eq!(sheet.status_on(date(2024, 3, 4)), Some(WorkStatus::Worked));
        assert_eq!(sheet.entries()[0].date, date(2024, 3, 1));
        assert!(sheet.is_marked(date(2024, 3, 1)));
        assert!(!sheet.is_marked(date(2024, 3, 2)));
    }

    #[test]
    fn test_salary_counts_only_worked_days_in_period() {
        let employee = Employee {
            id: 1,
            chat_id: 10,
            name: "Ivan Petrov".to_string(),
            position: "Foreman".to_string(),
            daily_salary: 1500.0,
            is_active: true,
            created_at: Utc::now(),
        };
        let sheet = Timesheet::new(
            1,
            vec![
                TimesheetEntry::new(1, date(2024, 5, 2), WorkStatus::Worked),
                TimesheetEntry::new(1, date(2024, 5, 3), WorkStatus::Worked),
                TimesheetEntry::new(1, date(2024, 5, 6), WorkStatus::Sick),
                TimesheetEntry::new(1, date(2024, 5, 20), WorkStatus::Worked),
            ],
        );
        let mut report = SalaryReport::new(PayPeriod::containing(date(2024, 5, 1)), Utc::now());
        let line = report.add_employee(&employee, &sheet).clone();
        assert_eq!(line.worked_days, 2);
        assert_eq!(line.sick_days, 1);
        assert!((line.total - 3000.0).abs() < f64::EPSILON);
        assert!((report.total_payroll() - 3000.0).abs() < f64::EPSILON);
        assert!(report.render().contains("Total payroll: 3000.00"));
    }

    #[test]
    fn test_parse_employee_input() {
        let parsed = parse_employee_input("Ivan Ivanov; Manager; 1500,50");
        assert_eq!(
            parsed.ok(),
            Some(("Ivan Ivanov".to_string(), "Manager".to_string(), 1500.5))
        );
        assert!(parse_employee_input("Ivan;Manager").is_err());
        assert!(parse_employee_input("Ivan;Manager;-5").is_err());
        assert!(parse_employee_input(";Manager;100").is_err());
        assert!(parse_employee_input("Ivan;Manager;lots").is_err());
    }

    #[test]
    fn test_work_status_parsing() {
        assert_eq!("present".parse::<WorkStatus>().ok(), Some(WorkStatus::Worked));
        assert_eq!("ILL".parse::<WorkStatus>().ok(), Some(WorkStatus::Sick));
        assert!("maybe".parse::<WorkStatus>().is_err());
    }
}
