pub mod digest;
pub mod health;
pub mod running_list;

pub use digest::DigestService;
pub use health::HealthService;
pub use running_list::RunningListService;
