use chrono::{Datelike, Utc};
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use crate::bot::commands::reject;
use crate::bot::handlers::{sender, HandlerResult};
use crate::bot::keyboards::status_keyboard;
use crate::services::RunningListService;
use crate::tracker::week::day_label;
use crate::tracker::RunningTask;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::log_command_success;
use crate::utils::markdown::{bold, code_block, escape_markdown};
use crate::utils::validation::{parse_id, parse_mark_args, parse_task_input, parse_toggle_args};

/// Details block plus status buttons for today when the task is due.
pub fn task_card(task: &RunningTask) -> (String, Option<InlineKeyboardMarkup>) {
    let today = Utc::now().weekday();
    let text = code_block(&task.details());
    let keyboard = (!task.is_archived() && task.week.is_scheduled(today))
        .then(|| status_keyboard(task.id, today));
    (text, keyboard)
}

/// [`task_card`] under a one-line header, as sent by /task and /add and
/// redrawn after a status button.
pub fn titled_task_card(header: &str, task: &RunningTask) -> (String, Option<InlineKeyboardMarkup>) {
    let (card, keyboard) = task_card(task);
    (format!("{}\n{}", escape_markdown(header), card), keyboard)
}

async fn send_task_card(feedback: &CommandFeedback, header: &str, task: &RunningTask) -> HandlerResult {
    let (text, keyboard) = titled_task_card(header, task);
    match keyboard {
        Some(keyboard) => feedback.with_keyboard(text, keyboard).await?,
        None => feedback.markdown(text).await?,
    };
    Ok(())
}

pub async fn handle_add(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };

    let (priority, days, description) = match parse_task_input(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            return reject(&feedback, &msg, "/add", &args, &e, "/add high mon,wed,fri Check the site").await;
        }
    };

    match list.add_task(user_id, &description, priority, &days).await {
        Ok(task) => {
            log_command_success("/add", &user, user_id, msg.chat.id.0, Some(&format!("task {}", task.id)));
            send_task_card(&feedback, &format!("✅ Task #{} created", task.id), &task).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_tasks(bot: Bot, msg: Message, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };

    match list.list_for_user(user_id).await {
        Ok(running) => {
            feedback
                .markdown(code_block(&running.render_board(Utc::now().weekday())))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_today(bot: Bot, msg: Message, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };
    let today = Utc::now().weekday();

    let running = match list.list_for_user(user_id).await {
        Ok(running) => running,
        Err(e) => {
            feedback.tracker_error(&e).await?;
            return Ok(());
        }
    };

    let due = running.scheduled_on(today);
    if due.is_empty() {
        feedback.success("Nothing left for today").await?;
        return Ok(());
    }

    let lines = due
        .iter()
        .map(|task| {
            let status = task.open_on(today).map(|s| s.emoji()).unwrap_or_default();
            format!("{} {} {} [#{}]", task.priority.emoji(), status, task.description, task.id)
        })
        .collect::<Vec<_>>()
        .join("\n");

    feedback
        .markdown(format!(
            "{}\n{}\n{}",
            bold(&format!("📌 Today ({})", day_label(today))),
            code_block(&lines),
            escape_markdown("Open a task with /task <id> to mark it"),
        ))
        .await?;
    Ok(())
}

pub async fn handle_archive(bot: Bot, msg: Message, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };

    match list.list_for_user(user_id).await {
        Ok(running) => {
            feedback.markdown(code_block(&running.render_archive())).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_task(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };
    let task_id = match parse_id(&args, "task") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/task", &args, &e, "/task 3").await,
    };

    match list.get_task(user_id, task_id).await {
        Ok(task) => send_task_card(&feedback, &format!("Task #{}", task.id), &task).await?,
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_mark(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    let (task_id, day, status) = match parse_mark_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/mark", &args, &e, "/mark 3 wed done").await,
    };

    match list.set_day_status(user_id, task_id, day, status).await {
        Ok(task) => {
            log_command_success("/mark", &user, user_id, msg.chat.id.0, Some(&format!("task {task_id} {status}")));
            feedback
                .success(&format!(
                    "Task #{}: {} {} {}\n{}",
                    task.id,
                    day_label(day),
                    status.emoji(),
                    status,
                    task.week_display()
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_toggle(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };
    let (task_id, day) = match parse_toggle_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/toggle", &args, &e, "/toggle 3 sat").await,
    };

    match list.toggle_day(user_id, task_id, day).await {
        Ok((task, scheduled)) => {
            let change = if scheduled { "added to" } else { "removed from" };
            feedback
                .success(&format!(
                    "{} {} the schedule of task #{}\n🔁 {}",
                    day_label(day),
                    change,
                    task.id,
                    task.schedule.describe()
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_complete(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };
    let task_id = match parse_id(&args, "task") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/complete", &args, &e, "/complete 3").await,
    };

    match list.complete_task(user_id, task_id).await {
        Ok(task) => {
            feedback
                .success(&format!("Task #{} archived: {}\nUse /reopen {} to bring it back", task.id, task.description, task.id))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_reopen(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };
    let task_id = match parse_id(&args, "task") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/reopen", &args, &e, "/reopen 3").await,
    };

    match list.reopen_task(user_id, task_id).await {
        Ok(task) => {
            feedback
                .success(&format!("Task #{} is back on the running list", task.id))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_delete(bot: Bot, msg: Message, args: String, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    let task_id = match parse_id(&args, "task") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/delete", &args, &e, "/delete 3").await,
    };

    match list.delete_task(user_id, task_id).await {
        Ok(task) => {
            log_command_success("/delete", &user, user_id, msg.chat.id.0, Some(&format!("task {task_id}")));
            feedback
                .success(&format!("Task #{} deleted: {}", task.id, task.description))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}
