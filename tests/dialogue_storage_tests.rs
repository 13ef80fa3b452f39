use std::sync::Arc;

use running_list_bot::bot::handlers::{BotHandler, State};
use running_list_bot::database::connection::DatabaseManager;
use running_list_bot::tracker::Priority;
use teloxide::dispatching::dialogue::{InMemStorage, Storage};
use tempfile::TempDir;

async fn create_handler() -> (BotHandler, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    (BotHandler::new(Arc::new(db)), temp_dir)
}

#[tokio::test]
async fn test_dialogue_storage_setup() {
    let (handler, _temp_dir) = create_handler().await;

    let storage = InMemStorage::<State>::new();
    let _deps = handler.dependencies(storage);

    // Building the schema validates the handler signatures against dptree
    let _schema = handler.schema();
}

#[test]
fn test_dialogue_starts_idle() {
    assert_eq!(State::default(), State::Idle);
}

#[test]
fn test_only_the_starter_can_answer_new_task_steps() {
    let steps = [
        State::AwaitingDescription { owner: 7 },
        State::AwaitingPriority {
            owner: 7,
            description: "Check the site".to_string(),
        },
        State::AwaitingDays {
            owner: 7,
            description: "Check the site".to_string(),
            priority: Priority::Low,
        },
    ];
    for state in steps {
        assert_eq!(state.owner(), Some(7));
        assert!(state.accepts(7));
        assert!(!state.accepts(8), "{state:?} accepted another member");
    }

    assert_eq!(State::Idle.owner(), None);
    assert!(State::Idle.accepts(8));
}

#[tokio::test]
async fn test_new_task_state_round_trips_through_storage() {
    let storage = InMemStorage::<State>::new();
    let chat = teloxide::types::ChatId(42);

    let state = State::AwaitingDays {
        owner: 7,
        description: "Check the site".to_string(),
        priority: Priority::High,
    };
    storage
        .clone()
        .update_dialogue(chat, state.clone())
        .await
        .expect("update dialogue");

    let stored = storage
        .clone()
        .get_dialogue(chat)
        .await
        .expect("get dialogue");
    assert_eq!(stored, Some(state));

    storage
        .clone()
        .remove_dialogue(chat)
        .await
        .expect("remove dialogue");
    let removed = storage.get_dialogue(chat).await.expect("get dialogue");
    assert_eq!(removed, None);
}
