mod actor;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use handle::CalendarHandle;
pub use models::CalendarEvent;
