use chrono::{Datelike, Utc, Weekday};
use running_list_bot::bot::commands::tasks::{task_card, titled_task_card};
use running_list_bot::bot::keyboards::{priority_keyboard, status_keyboard, CallbackData};
use running_list_bot::tracker::week::WEEK;
use running_list_bot::tracker::{DayStatus, Priority, RunningTask};
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

fn callback_payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_status_buttons_parse_back_to_their_task_and_day() {
    let keyboard = status_keyboard(17, Weekday::Thu);
    let parsed: Vec<CallbackData> = callback_payloads(&keyboard)
        .iter()
        .filter_map(|data| CallbackData::parse(data))
        .collect();

    assert_eq!(parsed.len(), 5);
    for data in &parsed {
        assert!(matches!(
            data,
            CallbackData::Status { task_id: 17, day: Weekday::Thu, .. }
        ));
    }
    assert!(parsed.contains(&CallbackData::Status {
        task_id: 17,
        day: Weekday::Thu,
        status: DayStatus::Postponed,
    }));
}

#[test]
fn test_priority_buttons_cover_every_priority() {
    let parsed: Vec<CallbackData> = callback_payloads(&priority_keyboard())
        .iter()
        .filter_map(|data| CallbackData::parse(data))
        .collect();
    let expected: Vec<CallbackData> = Priority::ALL.iter().map(|p| CallbackData::Priority(*p)).collect();
    assert_eq!(parsed, expected);
}

#[test]
fn test_legacy_and_garbage_callbacks_are_ignored() {
    assert_eq!(CallbackData::parse("session-1:option-2:yes"), None);
    assert_eq!(CallbackData::parse("settings:timezone"), None);
    assert_eq!(CallbackData::parse("st:1:9:done"), None);
    assert_eq!(CallbackData::parse("st:-1:0:done"), None);
    assert_eq!(CallbackData::parse("prio:extreme"), None);
}

#[test]
fn test_task_card_offers_today_buttons_only_when_due() {
    let today = Utc::now().weekday();

    let daily = RunningTask::new(5, 1, "Daily check", Priority::Medium, &WEEK);
    let (text, keyboard) = task_card(&daily);
    assert!(text.starts_with("```"));
    let keyboard = keyboard.map(|k| callback_payloads(&k)).unwrap_or_default();
    assert!(keyboard.iter().all(|data| matches!(
        CallbackData::parse(data),
        Some(CallbackData::Status { task_id: 5, day, .. }) if day == today
    )));
    assert!(!keyboard.is_empty());

    let other_days: Vec<Weekday> = WEEK.into_iter().filter(|d| *d != today).collect();
    let not_today = RunningTask::new(6, 1, "Not today", Priority::Low, &other_days);
    assert!(task_card(&not_today).1.is_none());

    let mut archived = RunningTask::new(7, 1, "Archived", Priority::High, &WEEK);
    assert!(archived.complete(Utc::now()).is_ok());
    assert!(task_card(&archived).1.is_none());
}

#[test]
fn test_redrawn_card_keeps_its_header() {
    let task = RunningTask::new(9, 1, "Pour concrete", Priority::Urgent, &WEEK);
    let (card, keyboard) = task_card(&task);
    let (text, titled_keyboard) = titled_task_card("Task #9", &task);

    assert_eq!(text, format!("Task \\#9\n{card}"));
    assert_eq!(
        keyboard.map(|k| callback_payloads(&k)),
        titled_keyboard.map(|k| callback_payloads(&k))
    );
}
