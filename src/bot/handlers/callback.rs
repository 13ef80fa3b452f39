use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, warn};

use crate::bot::commands::tasks::titled_task_card;
use crate::bot::handlers::dialogue::ask_for_days;
use crate::bot::handlers::{HandlerResult, State, TaskDialogue};
use crate::bot::keyboards::CallbackData;
use crate::services::RunningListService;
use crate::tracker::week::day_label;
use crate::utils::logging::log_command_error;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: TaskDialogue,
    list: RunningListService,
) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.as_deref().unwrap_or("unknown");
    let chat_id = q.message.as_ref().map(|m| m.chat.id.0).unwrap_or(0);

    let Some(data) = q.data.as_deref().and_then(CallbackData::parse) else {
        warn!(
            "Malformed callback data {:?} from user {} in chat {}",
            q.data, user_id, chat_id
        );
        bot.answer_callback_query(q.id)
            .text("Invalid button, please use the command again")
            .await?;
        return Ok(());
    };

    info!(
        "Callback received: {:?} from user {} ({}) in chat {}",
        data, username, user_id, chat_id
    );

    match data {
        CallbackData::Priority(priority) => {
            let Some(message) = q.message.as_ref() else {
                bot.answer_callback_query(q.id).await?;
                return Ok(());
            };
            match dialogue.get().await? {
                Some(state @ State::AwaitingPriority { .. }) if !state.accepts(user_id) => {
                    bot.answer_callback_query(q.id)
                        .text("Only the member who started /newtask can choose")
                        .await?;
                }
                Some(State::AwaitingPriority { owner, description }) => {
                    bot.answer_callback_query(q.id).await?;
                    ask_for_days(&bot, message.chat.id, &dialogue, owner, description, priority).await?;
                }
                _ => {
                    bot.answer_callback_query(q.id)
                        .text("This question has expired, start again with /newtask")
                        .await?;
                }
            }
        }
        CallbackData::Status {
            task_id,
            day,
            status,
        } => match list.set_day_status(user_id, task_id, day, status).await {
            Ok(task) => {
                bot.answer_callback_query(q.id.clone())
                    .text(format!("{} {}: {}", status.emoji(), day_label(day), status))
                    .await?;

                if let Some(message) = q.message.as_ref() {
                    let (text, keyboard) = titled_task_card(&format!("Task #{}", task.id), &task);
                    let edit = bot
                        .edit_message_text(message.chat.id, message.id, text)
                        .parse_mode(ParseMode::MarkdownV2);
                    let result = match keyboard {
                        Some(keyboard) => edit.reply_markup(keyboard).await,
                        None => edit.await,
                    };
                    // Telegram rejects edits that leave the message unchanged.
                    if let Err(e) = result {
                        warn!("Failed to refresh task {} card: {}", task_id, e);
                    }
                }
            }
            Err(e) => {
                if !e.is_user_facing() {
                    log_command_error("callback:status", username, user_id, chat_id, &format!("task {task_id}: {e}"));
                }
                let text = if e.is_user_facing() {
                    format!("❌ {e}")
                } else {
                    "❌ Could not save the status, try again later".to_string()
                };
                bot.answer_callback_query(q.id).text(text).await?;
            }
        },
    }

    Ok(())
}
