use teloxide::prelude::*;
use tracing::debug;

use crate::bot::handlers::{sender, HandlerResult, State, TaskDialogue};
use crate::bot::keyboards::priority_keyboard;
use crate::services::running_list::MAX_DESCRIPTION_LEN;
use crate::services::RunningListService;
use crate::tracker::week::parse_weekdays;
use crate::tracker::Priority;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_success, log_validation_error};
use crate::utils::markdown::{code_block, escape_markdown};

const DAYS_HINT: &str = "Send the days, for example: mon,wed,fri or mon-fri, daily, weekdays, weekend";

/// Entry point of /newtask.
pub async fn start_new_task(bot: Bot, msg: Message, dialogue: TaskDialogue) -> HandlerResult {
    let Some((owner, _)) = sender(&msg) else {
        return Ok(());
    };
    dialogue.update(State::AwaitingDescription { owner }).await?;
    bot.send_message(
        msg.chat.id,
        "📝 New task. What needs to be done?\nSend the description or /cancel",
    )
    .await?;
    Ok(())
}

/// Messages from other group members do not advance someone else's dialogue.
fn from_owner(msg: &Message, owner: i64) -> bool {
    let answered_by = sender(msg).map(|(id, _)| id);
    if answered_by != Some(owner) {
        debug!(
            "Ignoring {:?} in chat {}: /newtask belongs to user {}",
            answered_by, msg.chat.id.0, owner
        );
        return false;
    }
    true
}

pub async fn receive_description(bot: Bot, msg: Message, dialogue: TaskDialogue, owner: i64) -> HandlerResult {
    if !from_owner(&msg, owner) {
        return Ok(());
    }
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let Some(text) = msg.text().map(str::trim) else {
        feedback.warning("Please send the task description as text").await?;
        return Ok(());
    };

    if text.is_empty() || text.starts_with('/') {
        feedback
            .validation_error("That is not a task description", "Send plain text or /cancel")
            .await?;
        return Ok(());
    }
    if text.chars().count() > MAX_DESCRIPTION_LEN {
        feedback
            .validation_error(
                "The description is too long",
                &format!("Keep it under {MAX_DESCRIPTION_LEN} characters"),
            )
            .await?;
        return Ok(());
    }

    dialogue
        .update(State::AwaitingPriority {
            owner,
            description: text.to_string(),
        })
        .await?;
    bot.send_message(msg.chat.id, "🎯 Choose a priority")
        .reply_markup(priority_keyboard())
        .await?;
    Ok(())
}

/// Typed answer to the priority step; the buttons land in the callback
/// handler instead.
pub async fn receive_priority(
    bot: Bot,
    msg: Message,
    dialogue: TaskDialogue,
    (owner, description): (i64, String),
) -> HandlerResult {
    if !from_owner(&msg, owner) {
        return Ok(());
    }
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    match msg.text().unwrap_or_default().parse::<Priority>() {
        Ok(priority) => ask_for_days(&bot, msg.chat.id, &dialogue, owner, description, priority).await,
        Err(e) => {
            feedback.error(&e.to_string()).await?;
            bot.send_message(msg.chat.id, "🎯 Choose a priority")
                .reply_markup(priority_keyboard())
                .await?;
            Ok(())
        }
    }
}

pub async fn ask_for_days(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &TaskDialogue,
    owner: i64,
    description: String,
    priority: Priority,
) -> HandlerResult {
    dialogue
        .update(State::AwaitingDays {
            owner,
            description,
            priority,
        })
        .await?;
    bot.send_message(chat_id, format!("{priority} selected.\n📅 {DAYS_HINT}"))
        .await?;
    Ok(())
}

pub async fn receive_days(
    bot: Bot,
    msg: Message,
    dialogue: TaskDialogue,
    (owner, description, priority): (i64, String, Priority),
    tasks: RunningListService,
) -> HandlerResult {
    if !from_owner(&msg, owner) {
        return Ok(());
    }
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    let text = msg.text().unwrap_or_default();

    let days = match parse_weekdays(text) {
        Ok(days) => days,
        Err(e) => {
            log_validation_error("/newtask", text, &e.to_string(), user_id, msg.chat.id.0);
            feedback.validation_error(&e.to_string(), DAYS_HINT).await?;
            return Ok(());
        }
    };

    match tasks.add_task(user_id, &description, priority, &days).await {
        Ok(task) => {
            dialogue.exit().await?;
            log_command_success("/newtask", &user, user_id, msg.chat.id.0, Some(&format!("task {}", task.id)));
            feedback
                .markdown(format!(
                    "✅ {}\n{}",
                    escape_markdown(&format!("Task #{} created", task.id)),
                    code_block(&task.details())
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}
