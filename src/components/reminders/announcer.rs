use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Capability for delivering a reminder to the operator.
///
/// Delivery is best effort: failures are not surfaced to the caller.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, message: &str);
}

/// Speaks reminders through an OS text-to-speech command
pub struct SpeechAnnouncer {
    command: String,
}

impl SpeechAnnouncer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Announcer for SpeechAnnouncer {
    async fn announce(&self, message: &str) {
        // Detached spawn; the child outlives the dropped handle
        match Command::new(&self.command).arg(message).spawn() {
            Ok(_) => debug!("Spawned {} for announcement", self.command),
            Err(e) => debug!("Failed to spawn {}: {}", self.command, e),
        }
    }
}
