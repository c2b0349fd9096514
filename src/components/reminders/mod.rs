mod actor;
mod handle;
pub mod announcer;
pub mod queue;
pub mod scheduler;

pub use handle::ReminderHandle;
pub use scheduler::{plan_reminders, ReminderLedger, ReminderPlan};
