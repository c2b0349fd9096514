use crate::components::google_calendar::token::{SystemBrowser, TokenManager};
use crate::components::google_calendar::CalendarHandle;
use crate::components::reminders::announcer::{Announcer, SpeechAnnouncer};
use crate::components::reminders::{plan_reminders, ReminderHandle, ReminderLedger};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire up the components and run the poll loop until shutdown
pub async fn run(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (speech_command, poll_interval_secs, offsets, tz) = {
        let config_read = config.read().await;
        (
            config_read.speech_command.clone(),
            config_read.poll_interval_secs,
            config_read.reminder_offsets_min.clone(),
            config_read.parsed_timezone()?,
        )
    };

    // Make sure a usable credential exists before the first poll
    let token_manager = TokenManager::new(Arc::clone(&config), Arc::new(SystemBrowser));
    token_manager.ensure_authorized().await?;

    let calendar = CalendarHandle::new(Arc::clone(&config), token_manager);

    let announcer: Arc<dyn Announcer> = Arc::new(SpeechAnnouncer::new(speech_command));
    let reminders = ReminderHandle::new(announcer);

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_calendar = calendar.clone();
    let shutdown_reminders = reminders.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_calendar, shutdown_reminders).await;
    });

    // Spawn the poll loop
    let poll_task = tokio::spawn(async move {
        poll_loop(calendar, reminders, offsets, tz, poll_interval_secs).await;
    });

    // Wait for either the poll loop to end or a shutdown signal
    tokio::select! {
        result = poll_task => {
            error!("Poll loop ended unexpectedly");
            result.map_err(|e| Error::Other(format!("Poll task error: {}", e)))?;
            Ok(())
        }
        _ = shutdown_recv => {
            info!("Received shutdown signal, stopping");
            Ok(())
        }
    }
}

/// Fetch and schedule immediately, then on every poll interval
async fn poll_loop(
    calendar: CalendarHandle,
    reminders: ReminderHandle,
    offsets: Vec<i64>,
    tz: Tz,
    poll_interval_secs: u64,
) {
    let mut ledger = ReminderLedger::new();
    let mut interval = tokio::time::interval(Duration::from_secs(poll_interval_secs));

    loop {
        // The first tick completes immediately
        interval.tick().await;
        run_cycle(&calendar, &reminders, &mut ledger, &offsets, tz).await;
    }
}

/// One fetch-and-schedule pass over the upcoming events
async fn run_cycle(
    calendar: &CalendarHandle,
    reminders: &ReminderHandle,
    ledger: &mut ReminderLedger,
    offsets: &[i64],
    tz: Tz,
) {
    let events = match calendar.get_upcoming_events().await {
        Ok(events) => events,
        Err(e) => {
            // The next poll retries naturally
            error!("Failed to fetch events: {}", e);
            Vec::new()
        }
    };

    if events.is_empty() {
        info!("No upcoming events found");
    } else {
        info!("Upcoming events:");
        for event in &events {
            let start = event
                .start_date_time
                .as_deref()
                .or(event.start_date.as_deref())
                .unwrap_or("unknown start");
            info!("{} - {}", start, event.title());
        }
    }

    let now = Utc::now();
    ledger.evict_started(now);

    let plans = plan_reminders(ledger, &events, offsets, tz, now);
    if plans.is_empty() {
        return;
    }

    info!(
        "Scheduled {} new reminders ({} events tracked)",
        plans.len(),
        ledger.len()
    );

    if let Err(e) = reminders.schedule(plans).await {
        error!("Failed to hand reminders to the scheduler: {}", e);
    }
}
