use super::actor::{ReminderActor, ReminderActorHandle};
use super::announcer::Announcer;
use super::scheduler::ReminderPlan;
use crate::error::AppResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the reminder actor
#[derive(Clone)]
pub struct ReminderHandle {
    actor_handle: ReminderActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl ReminderHandle {
    /// Create a new ReminderHandle and spawn the actor
    pub fn new(announcer: Arc<dyn Announcer>) -> Self {
        let (mut actor, handle) = ReminderActor::new(announcer);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Enqueue planned reminders for firing
    pub async fn schedule(&self, plans: Vec<ReminderPlan>) -> AppResult<()> {
        self.actor_handle.schedule(plans).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}
