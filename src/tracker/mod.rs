//! Pure domain model: no I/O, no clocks except where a timestamp is passed in.

pub mod construction;
pub mod expenses;
pub mod list;
pub mod priority;
pub mod task;
pub mod timesheet;
pub mod week;

pub use list::{RunningList, WeekStats};
pub use priority::Priority;
pub use task::{RunningTask, StatusEntry};
pub use week::{DayStatus, Schedule, WeekGrid};
