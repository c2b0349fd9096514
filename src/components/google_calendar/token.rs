use crate::config::Config;
use crate::error::{auth_error, credential_error, AppResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// OAuth client settings as downloaded from the Google Cloud Console
#[derive(Debug, Clone, Deserialize)]
pub struct AppSecret {
    pub installed: InstalledSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledSecret {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

/// Long-lived credential persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl StoredToken {
    /// Whether the access token has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}

/// Shape of a token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Capability for opening the authorization URL in the operator's browser
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the system default browser
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Manages the OAuth credential: interactive authorization, persistence
/// and refresh of expired access tokens.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
    browser: Arc<dyn BrowserOpener>,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>, browser: Arc<dyn BrowserOpener>) -> Self {
        Self {
            config,
            client: Client::new(),
            browser,
        }
    }

    /// Make sure a usable credential exists, running the interactive
    /// authorization flow when no token has been stored yet.
    ///
    /// A malformed token file is a terminal error, not a trigger for
    /// re-authorization.
    pub async fn ensure_authorized(&self) -> AppResult<()> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.token_path.clone()
        };

        if Self::load_token(&token_path)?.is_some() {
            return Ok(());
        }

        info!("No stored token found, starting interactive authorization");
        let token = self.interactive_authorize().await?;
        self.store(&token).await?;
        info!("Token stored to {}", token_path);

        Ok(())
    }

    /// Get a valid access token, refreshing the stored one if it has expired
    pub async fn access_token(&self) -> AppResult<String> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.token_path.clone()
        };

        let token = Self::load_token(&token_path)?
            .ok_or_else(|| credential_error("No stored token. Run the get_token binary first."))?;

        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token);
        }

        let refreshed = self.refresh(&token).await?;
        Self::save_token(&token_path, &refreshed)?;

        Ok(refreshed.access_token)
    }

    /// Persist a token to the configured token path
    pub async fn store(&self, token: &StoredToken) -> AppResult<()> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.token_path.clone()
        };
        Self::save_token(&token_path, token)
    }

    /// Run the interactive authorization code flow: open the consent page
    /// in a browser, capture the redirect on a loopback listener and
    /// exchange the code for tokens.
    pub async fn interactive_authorize(&self) -> AppResult<StoredToken> {
        let secret = self.load_secret().await?;
        let redirect_uri = secret
            .redirect_uris
            .first()
            .cloned()
            .ok_or_else(|| credential_error("Client secret file lists no redirect URIs"))?;

        // Random state for security
        let state = Uuid::new_v4().to_string();

        let mut auth_url = Url::parse(AUTH_URL)
            .map_err(|e| auth_error(&format!("Failed to parse authorization URL: {}", e)))?;
        auth_url
            .query_pairs_mut()
            .append_pair("client_id", &secret.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", CALENDAR_SCOPE)
            .append_pair("state", &state);

        info!("Authorize this app by visiting {}", auth_url);
        if let Err(e) = self.browser.open(auth_url.as_str()) {
            warn!("Failed to open browser: {}", e);
        }

        let code = wait_for_code(&redirect_uri, &state)?;
        self.exchange_code(&secret, &redirect_uri, &code).await
    }

    /// Load the client secret file
    async fn load_secret(&self) -> AppResult<InstalledSecret> {
        let credentials_path = {
            let config_read = self.config.read().await;
            config_read.credentials_path.clone()
        };

        let content = fs::read_to_string(&credentials_path).map_err(|e| {
            credential_error(&format!(
                "Failed to read client secret file {}: {}",
                credentials_path, e
            ))
        })?;

        let secret: AppSecret = serde_json::from_str(&content).map_err(|e| {
            credential_error(&format!(
                "Malformed client secret file {}: {}",
                credentials_path, e
            ))
        })?;

        Ok(secret.installed)
    }

    /// Exchange an authorization code for tokens
    async fn exchange_code(
        &self,
        secret: &InstalledSecret,
        redirect_uri: &str,
        code: &str,
    ) -> AppResult<StoredToken> {
        let params = [
            ("client_id", secret.client_id.clone()),
            ("client_secret", secret.client_secret.clone()),
            ("code", code.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to exchange code: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        let refresh_token = token
            .refresh_token
            .ok_or_else(|| auth_error("Token response missing 'refresh_token' field"))?;
        let expires_at = Utc::now().timestamp() + token.expires_in.unwrap_or(3600);

        Ok(StoredToken {
            access_token: token.access_token,
            refresh_token,
            expires_at,
        })
    }

    /// Refresh an expired token
    async fn refresh(&self, token: &StoredToken) -> AppResult<StoredToken> {
        let secret = self.load_secret().await?;

        let params = [
            ("client_id", secret.client_id),
            ("client_secret", secret.client_secret),
            ("refresh_token", token.refresh_token.clone()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(StoredToken {
            access_token: refreshed.access_token,
            // The refresh grant usually omits the refresh token; keep the old one
            refresh_token: refreshed
                .refresh_token
                .unwrap_or_else(|| token.refresh_token.clone()),
            expires_at: Utc::now().timestamp() + refreshed.expires_in.unwrap_or(3600),
        })
    }

    /// Load the stored token, `None` when the file does not exist yet
    fn load_token(token_path: &str) -> AppResult<Option<StoredToken>> {
        let content = match fs::read_to_string(token_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(credential_error(&format!(
                    "Failed to read token file {}: {}",
                    token_path, e
                )))
            }
        };

        let token: StoredToken = serde_json::from_str(&content).map_err(|e| {
            credential_error(&format!("Malformed token file {}: {}", token_path, e))
        })?;

        Ok(Some(token))
    }

    /// Write the token file
    fn save_token(token_path: &str, token: &StoredToken) -> AppResult<()> {
        let content = serde_json::to_string_pretty(token)?;
        fs::write(token_path, content)?;
        Ok(())
    }
}

/// Listen on the redirect URI's loopback port for exactly one callback
/// carrying the authorization code, then shut the listener down.
fn wait_for_code(redirect_uri: &str, expected_state: &str) -> AppResult<String> {
    let parsed = Url::parse(redirect_uri)
        .map_err(|e| credential_error(&format!("Invalid redirect URI: {}", e)))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| credential_error("Redirect URI has no port"))?;

    let server = tiny_http::Server::http(format!("127.0.0.1:{}", port))
        .map_err(|e| auth_error(&format!("Failed to listen on port {}: {}", port, e)))?;
    info!("Waiting for authorization callback on port {}", port);

    let request = server.recv()?;

    let callback = Url::parse(&format!("http://localhost{}", request.url()))
        .map_err(|e| auth_error(&format!("Failed to parse callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in callback.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }
    let code = code.ok_or_else(|| auth_error("No authorization code found in callback"))?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    Ok(code)
}
