use super::models::CalendarEvent;
use super::time::sort_by_start;
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{fetch_error, AppResult};
use chrono::{Duration, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;
use url::Url;

/// The calendar actor that processes fetch requests
pub struct CalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<CalendarCommand>,
}

/// Commands that can be sent to the calendar actor
pub enum CalendarCommand {
    GetUpcomingEvents(mpsc::Sender<AppResult<Vec<CalendarEvent>>>),
    Shutdown,
}

/// Handle for communicating with the calendar actor
#[derive(Clone)]
pub struct CalendarActorHandle {
    command_tx: mpsc::Sender<CalendarCommand>,
}

impl CalendarActorHandle {
    /// Get upcoming events from the calendar
    pub async fn get_upcoming_events(&self) -> AppResult<Vec<CalendarEvent>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(CalendarCommand::GetUpcomingEvents(response_tx))
            .await
            .map_err(|e| fetch_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| fetch_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(CalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl CalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        token_manager: TokenManager,
    ) -> (Self, CalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            token_manager,
            client: Client::new(),
            command_rx,
        };

        let handle = CalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CalendarCommand::GetUpcomingEvents(response_tx) => {
                    let result = Self::fetch_upcoming(
                        Arc::clone(&self.config),
                        self.token_manager.clone(),
                        self.client.clone(),
                    )
                    .await;
                    let _ = response_tx.send(result).await;
                }
                CalendarCommand::Shutdown => {
                    info!("Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Calendar actor shut down");
    }

    /// Fetch single event instances starting inside the configured window,
    /// ordered by start time
    pub async fn fetch_upcoming(
        config: Arc<RwLock<Config>>,
        token_manager: TokenManager,
        client: Client,
    ) -> AppResult<Vec<CalendarEvent>> {
        let (calendar_id, window_hours, tz) = {
            let config_read = config.read().await;
            (
                config_read.calendar_id.clone(),
                config_read.fetch_window_hours,
                config_read.parsed_timezone()?,
            )
        };

        // Get authentication token
        let access_token = token_manager.access_token().await?;

        // Fetch window is [now, now + window)
        let now = Utc::now();
        let time_min = now.to_rfc3339();
        let time_max = (now + Duration::hours(window_hours)).to_rfc3339();

        let url_str = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            calendar_id
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("timeMin", &time_min)
            .append_pair("timeMax", &time_max)
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        // Make API request
        let response = client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(fetch_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events response: {}", e)))?;

        // An empty window has no "items" key at all
        let mut events: Vec<CalendarEvent> = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .map(|items| items.iter().map(CalendarEvent::from_item).collect())
            .unwrap_or_default();

        sort_by_start(&mut events, tz);

        Ok(events)
    }
}
