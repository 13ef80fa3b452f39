use std::collections::HashMap;

use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::commands::reject;
use crate::bot::handlers::{sender, HandlerResult};
use crate::database::models::{EmployeeRecord, TimesheetEntryRecord};
use crate::database::DatabaseManager;
use crate::error::{TrackerError, TrackerResult};
use crate::tracker::timesheet::{
    parse_employee_input, Employee, PayPeriod, SalaryReport, Timesheet, TimesheetEntry,
};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_success, log_database_operation};
use crate::utils::markdown::code_block;
use crate::utils::validation::{parse_attend_args, parse_id, parse_pay_period};

/// Active employee of this chat; others are reported as not found.
async fn load_employee(db: &DatabaseManager, chat_id: i64, employee_id: i64) -> TrackerResult<Employee> {
    EmployeeRecord::find_by_id(&db.pool, employee_id)
        .await?
        .filter(|record| record.chat_id == chat_id && record.is_active)
        .ok_or(TrackerError::NotFound {
            entity: "Employee",
            id: employee_id,
        })?
        .into_employee()
}

pub async fn handle_add_employee(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };

    let (name, position, salary) = match parse_employee_input(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            return reject(&feedback, &msg, "/addemployee", &args, &e, "/addemployee Ivan Petrov;Foreman;3500").await;
        }
    };

    log_database_operation("INSERT", "employees", Some(&name));
    match EmployeeRecord::create(&db.pool, msg.chat.id.0, &name, &position, salary).await {
        Ok(employee) => {
            log_command_success("/addemployee", &user, user_id, msg.chat.id.0, Some(&format!("employee {}", employee.id)));
            feedback
                .success(&format!(
                    "Employee #{} added: {} ({}), {:.2} per day",
                    employee.id, employee.name, employee.position, employee.daily_salary
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&TrackerError::from(e)).await?;
        }
    }
    Ok(())
}

pub async fn handle_employees(bot: Bot, msg: Message, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    let employees = match EmployeeRecord::find_active_by_chat(&db.pool, msg.chat.id.0).await {
        Ok(employees) => employees,
        Err(e) => {
            feedback.tracker_error(&TrackerError::from(e)).await?;
            return Ok(());
        }
    };

    if employees.is_empty() {
        feedback
            .validation_error(
                "No employees yet",
                "Add one with /addemployee Name;Position;DailySalary",
            )
            .await?;
        return Ok(());
    }

    let mut text = String::from("👷 Employees\n\n");
    for employee in &employees {
        text.push_str(&format!(
            "#{} {}, {} ({:.2}/day)\n",
            employee.id, employee.name, employee.position, employee.daily_salary
        ));
    }
    text.push_str("\nMark attendance with /attend <id> <status> [date]");
    feedback.markdown(code_block(&text)).await?;
    Ok(())
}

pub async fn handle_remove_employee(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let employee_id = match parse_id(&args, "employee") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/removeemployee", &args, &e, "/removeemployee 2").await,
    };

    let result = async {
        let employee = load_employee(db, msg.chat.id.0, employee_id).await?;
        EmployeeRecord::deactivate(&db.pool, employee.id).await?;
        Ok::<_, TrackerError>(employee)
    }
    .await;

    match result {
        Ok(employee) => {
            feedback
                .success(&format!("{} removed from the timesheet", employee.name))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_attend(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let (employee_id, status, date) = match parse_attend_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/attend", &args, &e, "/attend 2 worked 2024-03-05").await,
    };
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    let result = async {
        let employee = load_employee(db, msg.chat.id.0, employee_id).await?;
        let entry = TimesheetEntry::new(employee.id, date, status);
        log_database_operation("UPSERT", "timesheet_entries", Some(&format!("{} {}", employee.id, date)));
        TimesheetEntryRecord::upsert(&db.pool, &entry).await?;
        Ok::<_, TrackerError>(employee)
    }
    .await;

    match result {
        Ok(employee) => {
            feedback
                .success(&format!(
                    "{}: {} {} on {}",
                    employee.name,
                    status.emoji(),
                    status,
                    date.format("%d.%m.%Y")
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

/// Builds the salary report for every active employee of the chat.
pub async fn build_salary_report(
    db: &DatabaseManager,
    chat_id: i64,
    period: PayPeriod,
) -> TrackerResult<SalaryReport> {
    let employees = EmployeeRecord::find_active_by_chat(&db.pool, chat_id)
        .await?
        .into_iter()
        .map(EmployeeRecord::into_employee)
        .collect::<TrackerResult<Vec<_>>>()?;

    let ids: Vec<i64> = employees.iter().map(|e| e.id).collect();
    let mut entries: HashMap<i64, Vec<TimesheetEntry>> = HashMap::new();
    for record in TimesheetEntryRecord::find_by_employees_between(&db.pool, &ids, period.start, period.end).await? {
        let entry = record.into_entry()?;
        entries.entry(entry.employee_id).or_default().push(entry);
    }

    let mut report = SalaryReport::new(period, Utc::now());
    for employee in &employees {
        let sheet = Timesheet::new(employee.id, entries.remove(&employee.id).unwrap_or_default());
        report.add_employee(employee, &sheet);
    }
    Ok(report)
}

pub async fn handle_salary(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let period = match parse_pay_period(&args, Utc::now().date_naive()) {
        Ok(period) => period,
        Err(e) => return reject(&feedback, &msg, "/salary", &args, &e, "/salary prev").await,
    };

    match build_salary_report(db, msg.chat.id.0, period).await {
        Ok(report) => {
            feedback.markdown(code_block(&report.render())).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}
