use crate::error::{config_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// Calendar polled when none is configured
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// OS command used to speak announcements
pub const DEFAULT_SPEECH_COMMAND: &str = "say";

/// Delay between poll cycles, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Width of the upcoming-events fetch window, in hours
pub const DEFAULT_FETCH_WINDOW_HOURS: i64 = 24;

/// Reminder lead times, in minutes before event start
pub const DEFAULT_REMINDER_OFFSETS_MIN: [i64; 2] = [10, 2];

/// Main configuration structure for the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the OAuth client secret file from the Google Cloud Console
    pub credentials_path: String,
    /// Path where the OAuth token is persisted between runs
    pub token_path: String,
    /// Google Calendar ID to monitor
    pub calendar_id: String,
    /// Timezone used to resolve all-day event dates
    pub timezone: String,
    /// OS command invoked to speak announcements
    pub speech_command: String,
    /// Delay between poll cycles, in seconds
    pub poll_interval_secs: u64,
    /// Width of the upcoming-events fetch window, in hours
    pub fetch_window_hours: i64,
    /// Reminder lead times, in minutes before event start
    pub reminder_offsets_min: Vec<i64>,
}

/// On-disk override for reminder lead times
#[derive(Debug, Deserialize)]
struct RemindersFile {
    offsets_min: Vec<i64>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let credentials_path = env::var("GOOGLE_CREDENTIALS_PATH")
            .unwrap_or_else(|_| String::from("credentials.json"));
        let token_path =
            env::var("GOOGLE_TOKEN_PATH").unwrap_or_else(|_| String::from("token.json"));
        let calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from(DEFAULT_CALENDAR_ID));

        // Default timezone
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let speech_command =
            env::var("SPEECH_COMMAND").unwrap_or_else(|_| String::from(DEFAULT_SPEECH_COMMAND));

        // Parse numeric values
        let poll_interval_secs = match env::var("POLL_INTERVAL_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid POLL_INTERVAL_SECS format"))?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let fetch_window_hours = match env::var("FETCH_WINDOW_HOURS") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| config_error("Invalid FETCH_WINDOW_HOURS format"))?,
            Err(_) => DEFAULT_FETCH_WINDOW_HOURS,
        };

        // Initialize default reminder offsets
        let mut reminder_offsets_min = DEFAULT_REMINDER_OFFSETS_MIN.to_vec();

        // Load offsets configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/reminders.toml") {
            if let Ok(file) = toml::from_str::<RemindersFile>(&content) {
                if !file.offsets_min.is_empty() {
                    reminder_offsets_min = file.offsets_min;
                }
            }
        }

        Ok(Config {
            credentials_path,
            token_path,
            calendar_id,
            timezone,
            speech_command,
            poll_interval_secs,
            fetch_window_hours,
            reminder_offsets_min,
        })
    }

    /// Parse the configured timezone
    pub fn parsed_timezone(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }
}
