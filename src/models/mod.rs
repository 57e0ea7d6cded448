pub mod category;
pub mod log_record;
pub mod task;

pub use category::{Category, CategoryId};
pub use log_record::{LogFilter, LogPatch, LogRecord, NewLog};
pub use task::Task;
