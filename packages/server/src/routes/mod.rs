pub mod audit;
pub mod duration;
pub mod health;

pub use audit::audit_handler;
pub use duration::check_duration_handler;
pub use health::health_handler;
