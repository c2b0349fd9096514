use muistutin::components::google_calendar::token::{SystemBrowser, TokenManager};
use muistutin::config::Config;
use muistutin::error::AppResult;
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;
    let token_path = config.token_path.clone();
    let config = Arc::new(RwLock::new(config));

    let token_manager = TokenManager::new(Arc::clone(&config), Arc::new(SystemBrowser));

    // Run the interactive flow even when a token already exists, so this
    // binary can replace a revoked credential
    println!("Opening browser for Google Calendar authorization...");
    let token = token_manager.interactive_authorize().await?;
    token_manager.store(&token).await?;

    println!("Token saved to {}", token_path);

    Ok(())
}
