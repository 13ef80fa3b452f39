#![allow(clippy::unwrap_used)]

use chrono::Weekday;
use running_list_bot::database::connection::DatabaseManager;
use running_list_bot::services::digest::DigestService;
use running_list_bot::services::RunningListService;
use running_list_bot::tracker::{DayStatus, Priority};
use teloxide::Bot;
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> (DatabaseManager, TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (db, dir)
}

const USER: i64 = 1001;

#[tokio::test(flavor = "multi_thread")]
async fn test_digest_service_schedules_jobs_for_every_hour() {
    let (db, _temp_dir) = setup_test_db().await;
    let tasks = RunningListService::new(db.pool.clone());

    for hour in [0, 8, 23] {
        let mut service = DigestService::new(Bot::new("dummy"), tasks.clone(), hour)
            .await
            .unwrap();
        service.start().await.unwrap();
        service.stop().await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_manual_digest_with_nothing_due_sends_nothing() {
    let (db, _temp_dir) = setup_test_db().await;
    let tasks = RunningListService::new(db.pool.clone());
    let service = DigestService::new(Bot::new("dummy"), tasks, 8).await.unwrap();

    assert_eq!(service.send_digest_now().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_manual_rollover_resets_the_week() {
    let (db, _temp_dir) = setup_test_db().await;
    let tasks = RunningListService::new(db.pool.clone());
    let task = tasks
        .add_task(USER, "Weekly meeting", Priority::Medium, &[Weekday::Tue])
        .await
        .unwrap();
    tasks
        .set_day_status(USER, task.id, Weekday::Tue, DayStatus::Completed)
        .await
        .unwrap();

    let service = DigestService::new(Bot::new("dummy"), tasks.clone(), 8).await.unwrap();
    assert_eq!(service.rollover_now().await.unwrap(), 1);

    let rolled = tasks.get_task(USER, task.id).await.unwrap();
    assert_eq!(rolled.week.get(Weekday::Tue), Some(DayStatus::Pending));
    assert_eq!(rolled.history().len(), 1);
}
