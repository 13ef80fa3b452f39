pub mod construction;
pub mod employee;
pub mod expense;
pub mod running_task;

pub use construction::*;
pub use employee::*;
pub use expense::*;
pub use running_task::*;
