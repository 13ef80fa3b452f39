//! # Running List Bot
//!
//! A Telegram bot for small-business task tracking.
//!
//! ## Features
//! - Weekly running list: tasks with a priority and a schedule of weekdays,
//!   a per-day status grid and an append-only status history
//! - Daily digest of today's open tasks and a Monday rollover of every grid
//! - Employee timesheets with salary reports per half-month pay period
//! - Personal and work expenses with category reports
//! - Construction objects with stages, responsible people and comments
//! - Persistent storage with SQLite

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Error type shared by the domain and the services
pub mod error;
/// Background services like the digest scheduler and health checks
pub mod services;
/// Domain model: running list, timesheets, expenses and construction objects
pub mod tracker;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
