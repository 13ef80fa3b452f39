use chrono::{Datelike, Utc, Weekday};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::TrackerResult;
use crate::services::running_list::RunningListService;
use crate::utils::logging::log_system_event;
use crate::utils::markdown::{bold, code_block, escape_markdown};

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Runs the morning digest and the Monday rollover on cron schedules.
pub struct DigestService {
    bot: Bot,
    tasks: RunningListService,
    digest_hour: u32,
    scheduler: JobScheduler,
}

/// Message for one user: today's open tasks, most urgent first.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub user_id: i64,
    pub task_count: usize,
    pub text: String,
}

impl DigestService {
    pub async fn new(bot: Bot, tasks: RunningListService, digest_hour: u32) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            tasks,
            digest_hour,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        let bot = self.bot.clone();
        let tasks = self.tasks.clone();
        let digest_cron = format!("0 0 {} * * *", self.digest_hour);

        let digest_job = Job::new_async(digest_cron.as_str(), move |_uuid, _l| {
            let bot = bot.clone();
            let tasks = tasks.clone();
            Box::pin(async move {
                if let Err(e) = send_digests(&bot, &tasks).await {
                    tracing::error!("Failed to send daily digest: {}", e);
                }
            })
        })?;

        let tasks = self.tasks.clone();
        let rollover_job = Job::new_async("0 0 0 * * Mon", move |_uuid, _l| {
            let tasks = tasks.clone();
            Box::pin(async move {
                if let Err(e) = tasks.rollover_week().await {
                    tracing::error!("Weekly rollover failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(digest_job).await?;
        self.scheduler.add(rollover_job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "Digest service started",
            Some(&format!(
                "daily digest at {:02}:00 UTC, rollover Monday 00:00 UTC",
                self.digest_hour
            )),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual triggers for ops and tests
    pub async fn send_digest_now(&self) -> ServiceResult<usize> {
        send_digests(&self.bot, &self.tasks).await
    }

    pub async fn rollover_now(&self) -> TrackerResult<usize> {
        self.tasks.rollover_week().await
    }
}

/// Builds digests for every user with open work on `today`. Users whose
/// day is clear get nothing.
pub async fn build_digests(tasks: &RunningListService, today: Weekday) -> TrackerResult<Vec<Digest>> {
    let mut digests = Vec::new();
    for user_id in tasks.users_with_active_tasks().await? {
        let list = tasks.list_for_user(user_id).await?;
        let due = list.scheduled_on(today);
        if due.is_empty() {
            continue;
        }

        let lines = due
            .iter()
            .map(|task| {
                let status = task.open_on(today).map(|s| s.emoji()).unwrap_or_default();
                format!("{} {} {} [#{}]", task.priority.emoji(), status, task.description, task.id)
            })
            .collect::<Vec<_>>()
            .join("\n");

        digests.push(Digest {
            user_id,
            task_count: due.len(),
            text: format!(
                "{}\n{}\n{}",
                bold(&format!("☀️ Today: {} task(s)", due.len())),
                code_block(&lines),
                escape_markdown("Mark progress with /task <id>"),
            ),
        });
    }
    Ok(digests)
}

async fn send_digests(bot: &Bot, tasks: &RunningListService) -> ServiceResult<usize> {
    let digests = build_digests(tasks, Utc::now().weekday()).await?;
    let mut sent = 0;

    for digest in digests {
        // Running lists are private, so the user id doubles as the chat id.
        match bot
            .send_message(ChatId(digest.user_id), digest.text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(_) => sent += 1,
            Err(e) => tracing::error!("Failed to send digest to user {}: {}", digest.user_id, e),
        }
    }

    tracing::info!("Sent {} daily digest(s)", sent);
    Ok(sent)
}
