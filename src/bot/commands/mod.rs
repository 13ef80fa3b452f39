pub mod expenses;
pub mod objects;
pub mod stats;
pub mod tasks;
pub mod timesheet;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::handlers::{sender, HandlerResult};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::log_validation_error;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Running list bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Abort the current dialogue")]
    Cancel,

    #[command(description = "Create a task step by step")]
    NewTask,
    #[command(description = "Add a task: <priority> <days> <description>")]
    Add(String),
    #[command(description = "Show the weekly running list")]
    Tasks,
    #[command(description = "Show what is left for today")]
    Today,
    #[command(description = "Show archived tasks")]
    Archive,
    #[command(description = "Task details with today's buttons: <id>")]
    Task(String),
    #[command(description = "Set a day status: <id> <day> <status>")]
    Mark(String),
    #[command(description = "Add or remove a day: <id> <day>")]
    Toggle(String),
    #[command(description = "Archive a task: <id>")]
    Complete(String),
    #[command(description = "Bring back an archived task: <id>")]
    Reopen(String),
    #[command(description = "Delete a task for good: <id>")]
    Delete(String),
    #[command(description = "Weekly statistics")]
    Stats,

    #[command(description = "Add an employee: Name;Position;Daily salary")]
    AddEmployee(String),
    #[command(description = "List employees")]
    Employees,
    #[command(description = "Remove an employee: <id>")]
    RemoveEmployee(String),
    #[command(description = "Mark attendance: <id> <worked|absent|sick|vacation> [date]")]
    Attend(String),
    #[command(description = "Salary report: [date|prev]")]
    Salary(String),

    #[command(description = "Log an expense: kind;category;amount;description")]
    Expense(String),
    #[command(description = "Show expense categories")]
    Categories,
    #[command(description = "Expense report: [days]")]
    Report(String),
    #[command(description = "Delete all expenses of this chat")]
    ClearExpenses,

    #[command(description = "Add a construction object: Name;Address")]
    AddObject(String),
    #[command(description = "List construction objects")]
    Objects,
    #[command(description = "Object details: <id>")]
    Object(String),
    #[command(description = "Move an object to the next stage: <id>")]
    NextStage(String),
    #[command(description = "Comment on the current stage: <id> <text>")]
    Comment(String),
    #[command(description = "Add a responsible person: <id> Name;Position;Phone[;Email]")]
    AddPerson(String),
    #[command(description = "Remove a responsible person: <id> <n>")]
    RemovePerson(String),
    #[command(description = "Mark an object as finished: <id>")]
    FinishObject(String),
}

/// Reports a bad argument string and logs it.
pub(crate) async fn reject(
    feedback: &CommandFeedback,
    msg: &Message,
    command: &str,
    args: &str,
    error: &(dyn std::fmt::Display + Sync),
    example: &str,
) -> HandlerResult {
    let user_id = sender(msg).map(|(id, _)| id).unwrap_or_default();
    log_validation_error(command, args, &error.to_string(), user_id, msg.chat.id.0);
    feedback
        .validation_error(&error.to_string(), &format!("Example: {example}"))
        .await?;
    Ok(())
}

