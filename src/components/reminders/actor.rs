use super::announcer::Announcer;
use super::queue::ReminderQueue;
use super::scheduler::ReminderPlan;
use crate::error::{other_error, AppResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::info;

/// Wait between wakeups when no reminders are pending
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// The reminder actor that owns the pending queue and fires announcements
pub struct ReminderActor {
    queue: ReminderQueue,
    announcer: Arc<dyn Announcer>,
    command_rx: mpsc::Receiver<ReminderCommand>,
}

/// Commands that can be sent to the reminder actor
pub enum ReminderCommand {
    Schedule(Vec<ReminderPlan>),
    Shutdown,
}

/// Handle for communicating with the reminder actor
#[derive(Clone)]
pub struct ReminderActorHandle {
    command_tx: mpsc::Sender<ReminderCommand>,
}

impl ReminderActorHandle {
    /// Enqueue planned reminders for firing
    pub async fn schedule(&self, plans: Vec<ReminderPlan>) -> AppResult<()> {
        self.command_tx
            .send(ReminderCommand::Schedule(plans))
            .await
            .map_err(|e| other_error(&format!("Actor mailbox error: {}", e)))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(ReminderCommand::Shutdown).await;
        Ok(())
    }
}

impl ReminderActor {
    /// Create a new actor and return its handle
    pub fn new(announcer: Arc<dyn Announcer>) -> (Self, ReminderActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            queue: ReminderQueue::new(),
            announcer,
            command_rx,
        };

        let handle = ReminderActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop: sleep until the next reminder is
    /// due or a command arrives, whichever comes first.
    pub async fn run(&mut self) {
        info!("Reminder actor started");

        loop {
            let wait = match self.queue.next_fire_at() {
                Some(fire_at) => (fire_at - Utc::now()).to_std().unwrap_or(Duration::ZERO),
                None => IDLE_WAIT,
            };

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(ReminderCommand::Schedule(plans)) => {
                        for plan in plans {
                            self.queue.push(plan);
                        }
                    }
                    Some(ReminderCommand::Shutdown) | None => {
                        info!("Reminder actor shutting down");
                        break;
                    }
                },
                _ = sleep(wait) => {
                    for due in self.queue.pop_due(Utc::now()) {
                        info!("Reminder due: {}", due.message);
                        self.announcer.announce(&due.message).await;
                    }
                }
            }
        }

        info!("Reminder actor shut down");
    }
}
