mod logger;
pub use logger::*;

mod view;
pub use view::{log_decision, message_for};
