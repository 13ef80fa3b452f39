use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::commands::reject;
use crate::bot::handlers::{sender, HandlerResult};
use crate::database::models::{
    ConstructionCommentRecord, ConstructionObjectRecord, ResponsiblePersonRecord,
};
use crate::database::DatabaseManager;
use crate::error::{TrackerError, TrackerResult};
use crate::tracker::construction::{parse_object_input, ConstructionObject, ResponsiblePerson};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::log_command_success;
use crate::utils::markdown::code_block;
use crate::utils::validation::{parse_id, parse_id_and_text, parse_person_position};

/// Object of this chat with people and comments; others are not found.
pub async fn load_object(db: &DatabaseManager, chat_id: i64, object_id: i64) -> TrackerResult<ConstructionObject> {
    ConstructionObjectRecord::load(&db.pool, object_id)
        .await?
        .filter(|object| object.chat_id == chat_id)
        .ok_or(TrackerError::NotFound {
            entity: "Object",
            id: object_id,
        })
}

fn ensure_open(object: &ConstructionObject) -> TrackerResult<()> {
    if object.is_completed() {
        return Err(TrackerError::InvalidInput(format!(
            "Object #{} is already finished",
            object.id
        )));
    }
    Ok(())
}

pub async fn handle_add_object(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    let (name, address) = match parse_object_input(&args) {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/addobject", &args, &e, "/addobject Warehouse;Main st. 1").await,
    };

    match ConstructionObjectRecord::create(&db.pool, msg.chat.id.0, &name, &address).await {
        Ok(object) => {
            log_command_success("/addobject", &user, user_id, msg.chat.id.0, Some(&format!("object {}", object.id)));
            feedback
                .success(&format!(
                    "Object #{} created: {}\nAdd responsible people with /addperson {} Name;Position;Phone",
                    object.id, object.name, object.id
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&TrackerError::from(e)).await?;
        }
    }
    Ok(())
}

pub async fn handle_objects(bot: Bot, msg: Message, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    let objects = async {
        ConstructionObjectRecord::find_by_chat(&db.pool, msg.chat.id.0)
            .await
            .map_err(TrackerError::from)?
            .into_iter()
            .map(|record| record.into_object(Vec::new(), Vec::new()))
            .collect::<TrackerResult<Vec<_>>>()
    }
    .await;

    match objects {
        Ok(objects) if objects.is_empty() => {
            feedback
                .validation_error("No construction objects yet", "Add one with /addobject Name;Address")
                .await?;
        }
        Ok(objects) => {
            let mut text = String::from("🏗 Construction objects\n\n");
            for object in &objects {
                text.push_str(&object.summary_line());
                text.push('\n');
            }
            text.push_str("\nDetails: /object <id>");
            feedback.markdown(code_block(&text)).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_object(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let object_id = match parse_id(&args, "object") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/object", &args, &e, "/object 1").await,
    };

    match load_object(db, msg.chat.id.0, object_id).await {
        Ok(object) => {
            feedback.markdown(code_block(&object.details())).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_next_stage(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let object_id = match parse_id(&args, "object") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/nextstage", &args, &e, "/nextstage 1").await,
    };

    let result = async {
        let mut object = load_object(db, msg.chat.id.0, object_id).await?;
        ensure_open(&object)?;
        if !object.advance_stage() {
            return Err(TrackerError::InvalidInput(format!(
                "Object #{} is already at the last stage, finish it with /finishobject {}",
                object.id, object.id
            )));
        }
        ConstructionObjectRecord::update_stage(&db.pool, object.id, object.stage).await?;
        Ok::<_, TrackerError>(object)
    }
    .await;

    match result {
        Ok(object) => {
            feedback
                .success(&format!("{} moved to stage: {}", object.name, object.stage))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_comment(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let (object_id, text) = match parse_id_and_text(&args, "object") {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/comment", &args, &e, "/comment 1 Formwork accepted").await,
    };

    let result = async {
        let mut object = load_object(db, msg.chat.id.0, object_id).await?;
        let comment = object.add_comment(text, Utc::now()).clone();
        ConstructionCommentRecord::add(&db.pool, object.id, &comment).await?;
        Ok::<_, TrackerError>(comment)
    }
    .await;

    match result {
        Ok(comment) => {
            feedback
                .success(&format!("Comment saved to stage: {}", comment.stage))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_add_person(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let example = "/addperson 1 Anna Smirnova;Site manager;+7 900 123 45 67";
    let (object_id, text) = match parse_id_and_text(&args, "object") {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/addperson", &args, &e, example).await,
    };
    let person = match ResponsiblePerson::parse(&text) {
        Ok(person) => person,
        Err(e) => return reject(&feedback, &msg, "/addperson", &args, &e, example).await,
    };

    let result = async {
        let mut object = load_object(db, msg.chat.id.0, object_id).await?;
        ResponsiblePersonRecord::add(&db.pool, object.id, &person).await?;
        object.add_person(person.clone());
        Ok::<_, TrackerError>(object)
    }
    .await;

    match result {
        Ok(object) => {
            feedback
                .success(&format!(
                    "{} is now responsible for {} ({} in total)",
                    person.name,
                    object.name,
                    object.persons.len()
                ))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_remove_person(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let (object_id, position) = match parse_person_position(&args) {
        Ok(parsed) => parsed,
        Err(e) => return reject(&feedback, &msg, "/removeperson", &args, &e, "/removeperson 1 2").await,
    };

    let result = async {
        let mut object = load_object(db, msg.chat.id.0, object_id).await?;
        let index = position - 1;
        let name = object.persons.get(index).map(|p| p.name.clone());
        if !object.remove_person(index) {
            return Err(TrackerError::InvalidInput(format!(
                "Object #{} has no person number {}",
                object.id, position
            )));
        }
        let records = ResponsiblePersonRecord::find_by_object(&db.pool, object.id).await?;
        if let Some(record) = records.get(index) {
            ResponsiblePersonRecord::delete(&db.pool, record.id).await?;
        }
        Ok::<_, TrackerError>(name.unwrap_or_default())
    }
    .await;

    match result {
        Ok(name) => {
            feedback.success(&format!("{name} removed from the object")).await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_finish_object(bot: Bot, msg: Message, args: String, db: &DatabaseManager) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some((user_id, user)) = sender(&msg) else {
        return Ok(());
    };
    let object_id = match parse_id(&args, "object") {
        Ok(id) => id,
        Err(e) => return reject(&feedback, &msg, "/finishobject", &args, &e, "/finishobject 1").await,
    };

    let result = async {
        let mut object = load_object(db, msg.chat.id.0, object_id).await?;
        ensure_open(&object)?;
        let now = Utc::now();
        object.complete(now);
        ConstructionObjectRecord::mark_completed(&db.pool, object.id, now).await?;
        Ok::<_, TrackerError>(object)
    }
    .await;

    match result {
        Ok(object) => {
            log_command_success("/finishobject", &user, user_id, msg.chat.id.0, Some(&format!("object {}", object.id)));
            feedback
                .success(&format!("🏁 {} is finished", object.name))
                .await?;
        }
        Err(e) => {
            feedback.tracker_error(&e).await?;
        }
    }
    Ok(())
}
