use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::utils::feedback::CommandFeedback;

pub async fn handle_general_message(bot: Bot, msg: Message) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    if let Some(text) = msg.text() {
        let lower = text.to_lowercase();
        if text.starts_with('/') {
            let command = text.split_whitespace().next().unwrap_or(text);
            feedback
                .validation_error(
                    &format!("Unknown command: {command}"),
                    "Use /help to see all available commands, or check your command syntax.",
                )
                .await?;
        } else if lower.contains("task") || lower.contains("todo") {
            feedback
                .info("Want to plan something? Try /newtask, or /add high mon,wed Check the site")
                .await?;
        } else if lower.contains("help") {
            feedback.info("Use /help to see all available commands and examples!").await?;
        }
        // Anything else stays unanswered to avoid spam.
    }

    Ok(())
}
