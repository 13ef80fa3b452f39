/// Command parsing and the handlers behind each command
pub mod commands;
/// Dispatcher schema, dialogue states and update handlers
pub mod handlers;
/// Inline keyboards and callback data
pub mod keyboards;
