pub mod callback;
pub mod dialogue;
pub mod general_message;
pub mod message;

use std::sync::Arc;

use teloxide::{
    dispatching::{
        dialogue::{self as teloxide_dialogue, InMemStorage},
        UpdateHandler,
    },
    prelude::*,
};

use crate::bot::commands::Command;
use crate::database::DatabaseManager;
use crate::services::RunningListService;
use crate::tracker::Priority;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;
pub type TaskDialogue = Dialogue<State, InMemStorage<State>>;

/// Per-chat dialogue state of the /newtask flow. `owner` is the user who
/// started it; in group chats only they can answer the steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum State {
    #[default]
    Idle,
    AwaitingDescription {
        owner: i64,
    },
    AwaitingPriority {
        owner: i64,
        description: String,
    },
    AwaitingDays {
        owner: i64,
        description: String,
        priority: Priority,
    },
}

impl State {
    pub fn owner(&self) -> Option<i64> {
        match self {
            State::Idle => None,
            State::AwaitingDescription { owner }
            | State::AwaitingPriority { owner, .. }
            | State::AwaitingDays { owner, .. } => Some(*owner),
        }
    }

    /// Whether `user_id` may answer the current step.
    pub fn accepts(&self, user_id: i64) -> bool {
        self.owner().map_or(true, |owner| owner == user_id)
    }
}

/// Everything the handlers pull out of the dependency map.
#[derive(Clone)]
pub struct BotHandler {
    pub db: Arc<DatabaseManager>,
    pub tasks: RunningListService,
}

impl BotHandler {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        let tasks = RunningListService::new(db.pool.clone());
        Self { db, tasks }
    }

    pub fn dependencies(&self, storage: Arc<InMemStorage<State>>) -> DependencyMap {
        dptree::deps![storage, self.db.clone(), self.tasks.clone()]
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        use dptree::case;

        let command_handler = Update::filter_message()
            .filter_command::<Command>()
            .endpoint(message::command_handler);

        let dialogue_handler = Update::filter_message()
            .branch(case![State::AwaitingDescription { owner }].endpoint(dialogue::receive_description))
            .branch(
                case![State::AwaitingPriority { owner, description }].endpoint(dialogue::receive_priority),
            )
            .branch(
                case![State::AwaitingDays { owner, description, priority }].endpoint(dialogue::receive_days),
            )
            .branch(dptree::endpoint(general_message::handle_general_message));

        let callback_handler = Update::filter_callback_query().endpoint(callback::callback_handler);

        teloxide_dialogue::enter::<Update, InMemStorage<State>, State, _>()
            .branch(command_handler)
            .branch(dialogue_handler)
            .branch(callback_handler)
    }
}

/// Sender id and a printable name for logs.
pub(crate) fn sender(msg: &Message) -> Option<(i64, String)> {
    msg.from().map(|user| {
        let name = user
            .username
            .clone()
            .unwrap_or_else(|| user.first_name.clone());
        (user.id.0 as i64, name)
    })
}
