use super::actor::{CalendarActor, CalendarActorHandle};
use super::models::CalendarEvent;
use super::token::TokenManager;
use crate::config::Config;
use crate::error::AppResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the calendar actor
#[derive(Clone)]
pub struct CalendarHandle {
    actor_handle: CalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl CalendarHandle {
    /// Create a new CalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, token_manager: TokenManager) -> Self {
        let (mut actor, handle) = CalendarActor::new(config, token_manager);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Get upcoming events from the calendar
    pub async fn get_upcoming_events(&self) -> AppResult<Vec<CalendarEvent>> {
        self.actor_handle.get_upcoming_events().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}
