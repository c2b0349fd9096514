// Export components
pub mod google_calendar;
pub mod reminders;
