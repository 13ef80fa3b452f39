use teloxide::prelude::*;

use crate::bot::handlers::{sender, HandlerResult};
use crate::services::running_list::UserStats;
use crate::services::RunningListService;
use crate::tracker::DayStatus;
use crate::utils::feedback::CommandFeedback;
use crate::utils::markdown::{bold, escape_markdown};

pub async fn handle_stats(bot: Bot, msg: Message, list: &RunningListService) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, _)) = sender(&msg) else {
        return Ok(());
    };

    match list.stats(user_id).await {
        Ok(stats) if stats.week.active_tasks == 0 && stats.week.archived_tasks == 0 => {
            feedback
                .validation_error(
                    "No statistics yet, the running list is empty",
                    "Create your first task with /newtask",
                )
                .await?;
        }
        Ok(stats) => {
            feedback.markdown(render_stats(&stats)).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

/// MarkdownV2 summary of the current week.
pub fn render_stats(stats: &UserStats) -> String {
    let week = &stats.week;
    let mut text = format!("{}\n\n", bold("📊 Weekly statistics"));

    let body = format!(
        "📋 Tasks: {} active, {} archived\n\
        📅 Scheduled slots: {}\n\
        {} Done: {}\n\
        {} Partial: {}\n\
        {} Cancelled: {}\n\
        ⏳ Still pending: {}\n\
        ✍️ Status changes since Monday: {}\n\n\
        🎯 Completion rate: {:.1}%",
        week.active_tasks,
        week.archived_tasks,
        week.scheduled_slots,
        DayStatus::Completed.emoji(),
        week.completed,
        DayStatus::Partial.emoji(),
        week.partial,
        DayStatus::Cancelled.emoji(),
        week.cancelled,
        week.pending,
        stats.actions_this_week,
        week.completion_rate(),
    );
    text.push_str(&escape_markdown(&body));

    let medal = match week.completion_rate() {
        rate if rate >= 90.0 => Some("🏆 Outstanding week!"),
        rate if rate >= 60.0 => Some("👍 Solid progress"),
        _ => None,
    };
    if let Some(medal) = medal {
        text.push_str(&format!("\n{}", escape_markdown(medal)));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::WeekStats;

    #[test]
    fn test_render_stats_escapes_and_rates() {
        let stats = UserStats {
            week: WeekStats {
                active_tasks: 2,
                archived_tasks: 1,
                scheduled_slots: 4,
                pending: 0,
                completed: 4,
                partial: 0,
                cancelled: 0,
            },
            actions_this_week: 5,
        };
        let text = render_stats(&stats);
        assert!(text.contains("Completion rate: 100\\.0%"));
        assert!(text.contains("Outstanding week\\!"));
        assert!(text.contains("Status changes since Monday: 5"));
    }
}
