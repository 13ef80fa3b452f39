use chrono::{Duration, Utc};
use teloxide::prelude::*;

use crate::bot::commands::reject;
use crate::bot::handlers::{sender, HandlerResult};
use crate::database::models::ExpenseRecord;
use crate::database::DatabaseManager;
use crate::error::{TrackerError, TrackerResult};
use crate::tracker::expenses::{parse_expense_input, ExpenseKind, ExpenseReport};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_success, log_database_operation};
use crate::utils::markdown::code_block;
use crate::utils::validation::parse_report_days;

const REPORT_TOP_CATEGORIES: usize = 5;

pub async fn handle_expense(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };

    let expense = match parse_expense_input(&args) {
        Ok(expense) => expense,
        Err(e) => {
            return reject(&feedback, &msg, "/expense", &args, &e, "/expense work;Equipment;5000;New monitor").await;
        }
    };

    log_database_operation("INSERT", "expenses", Some(expense.category));
    match ExpenseRecord::create(&db.pool, msg.chat.id.0, &expense, Utc::now()).await {
        Ok(record) => {
            log_command_success("/expense", &user, user_id, msg.chat.id.0, Some(&record.id));
            feedback
                .success(&format!(
                    "Saved {:.2} to {} ({})",
                    record.amount,
                    record.category,
                    expense.kind.as_str()
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&TrackerError::from(e)).await?;
        }
    }
    Ok(())
}

pub fn render_categories() -> String {
    let mut text = String::from("🗂 Expense categories\n");
    for kind in [ExpenseKind::Personal, ExpenseKind::Work] {
        text.push_str(&format!("\n{}:\n", kind.as_str()));
        for (name, hint) in kind.categories() {
            text.push_str(&format!("• {name}: {hint}\n"));
        }
    }
    text.push_str("\nFormat: /expense kind;category;amount;description");
    text
}

pub async fn handle_categories(bot: Bot, msg: Message) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    feedback.markdown(code_block(&render_categories())).await?;
    Ok(())
}

/// Report over the last `days` days of the chat's expenses.
pub async fn expense_report(db: &DatabaseManager, chat_id: i64, days: i64) -> TrackerResult<ExpenseReport> {
    let now = Utc::now();
    let expenses = ExpenseRecord::find_by_chat_since(&db.pool, chat_id, now - Duration::days(days))
        .await?
        .into_iter()
        .map(ExpenseRecord::into_expense)
        .collect::<TrackerResult<Vec<_>>>()?;
    Ok(ExpenseReport::build(&expenses, days, now))
}

pub async fn handle_report(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let days = match parse_report_days(&args) {
        Ok(days) => days,
        Err(e) => return reject(&feedback, &msg, "/report", &args, &e, "/report 7").await,
    };

    match expense_report(db, msg.chat.id.0, days).await {
        Ok(report) => {
            feedback
                .markdown(code_block(&report.render(REPORT_TOP_CATEGORIES)))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_clear(bot: Bot, msg: Message, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };

    log_database_operation("DELETE", "expenses", Some(&format!("chat {}", msg.chat.id.0)));
    match ExpenseRecord::delete_by_chat(&db.pool, msg.chat.id.0).await {
        Ok(0) => {
            feedback.info("There were no expenses to delete").await?;
        }
        Ok(removed) => {
            log_command_success("/clearexpenses", &user, user_id, msg.chat.id.0, Some(&format!("{removed} rows")));
            feedback.success(&format!("Deleted {removed} expense(s)")).await?;
        }
        Err(e) => {
            feedback.tracker_error(&TrackerError::from(e)).await?;
        }
    }
    Ok(())
}
