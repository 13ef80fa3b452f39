use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{expenses, objects, stats, tasks, timesheet, Command};
use crate::bot::handlers::dialogue as task_dialogue;
use crate::bot::handlers::{sender, HandlerResult, State, TaskDialogue};
use crate::database::DatabaseManager;
use crate::services::RunningListService;
use crate::utils::logging::log_command_start;

const WELCOME: &str = "📋 Welcome to the running list bot!\n\n\
Plan recurring work on a weekly board and mark every day as done, partial, \
cancelled or postponed.\n\n\
• /newtask creates a task step by step\n\
• /tasks shows the week, /today what is left for today\n\
• /employees, /expense and /objects cover timesheets, expenses and construction sites\n\n\
Use /help to see all commands.";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: TaskDialogue,
    db: Arc<DatabaseManager>,
    list: RunningListService,
) -> HandlerResult {
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    log_command_start(&format!("{cmd:?}"), &user, user_id, msg.chat.id.0, None);

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME).await?;
        }
        Command::Cancel => {
            let active = !matches!(dialogue.get().await?, None | Some(State::Idle));
            dialogue.exit().await?;
            let text = if active {
                "🚫 Cancelled"
            } else {
                "Nothing to cancel"
            };
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::NewTask => task_dialogue::start_new_task(bot, msg, dialogue).await?,
        Command::Add(args) => tasks::handle_add(bot, msg, args, &list).await?,
        Command::Tasks => tasks::handle_tasks(bot, msg, &list).await?,
        Command::Today => tasks::handle_today(bot, msg, &list).await?,
        Command::Archive => tasks::handle_archive(bot, msg, &list).await?,
        Command::Task(args) => tasks::handle_task(bot, msg, args, &list).await?,
        Command::Mark(args) => tasks::handle_mark(bot, msg, args, &list).await?,
        Command::Toggle(args) => tasks::handle_toggle(bot, msg, args, &list).await?,
        Command::Complete(args) => tasks::handle_complete(bot, msg, args, &list).await?,
        Command::Reopen(args) => tasks::handle_reopen(bot, msg, args, &list).await?,
        Command::Delete(args) => tasks::handle_delete(bot, msg, args, &list).await?,
        Command::Stats => stats::handle_stats(bot, msg, &list).await?,

        Command::AddEmployee(args) => timesheet::handle_add_employee(bot, msg, args, &db).await?,
        Command::Employees => timesheet::handle_employees(bot, msg, &db).await?,
        Command::RemoveEmployee(args) => {
            timesheet::handle_remove_employee(bot, msg, args, &db).await?
        }
        Command::Attend(args) => timesheet::handle_attend(bot, msg, args, &db).await?,
        Command::Salary(args) => timesheet::handle_salary(bot, msg, args, &db).await?,

        Command::Expense(args) => expenses::handle_expense(bot, msg, args, &db).await?,
        Command::Categories => expenses::handle_categories(bot, msg).await?,
        Command::Report(args) => expenses::handle_report(bot, msg, args, &db).await?,
        Command::ClearExpenses => expenses::handle_clear(bot, msg, &db).await?,

        Command::AddObject(args) => objects::handle_add_object(bot, msg, args, &db).await?,
        Command::Objects => objects::handle_objects(bot, msg, &db).await?,
        Command::Object(args) => objects::handle_object(bot, msg, args, &db).await?,
        Command::NextStage(args) => objects::handle_next_stage(bot, msg, args, &db).await?,
        Command::Comment(args) => objects::handle_comment(bot, msg, args, &db).await?,
        Command::AddPerson(args) => objects::handle_add_person(bot, msg, args, &db).await?,
        Command::RemovePerson(args) => objects::handle_remove_person(bot, msg, args, &db).await?,
        Command::FinishObject(args) => objects::handle_finish_object(bot, msg, args, &db).await?,
    }
    Ok(())
}
