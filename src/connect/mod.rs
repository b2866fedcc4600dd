//! Garmin Connect integration for vitals.
//!
//! Provides the authenticated session used by every query command,
//! including token persistence, the interactive SSO login flow, and
//! the HTTP client for the Connect API.
//!
//! # Submodules
//!
//! - `client` - HTTP client for the Connect API
//! - `session` - persisted OAuth token bundle (`~/.garminconnect`)
//! - `sso` - interactive single sign-on flow with MFA support

pub mod client;
pub mod session;
pub mod sso;

// Re-exports for external use
pub use client::ConnectClient;
pub use session::{SessionTokens, TokenStore};

/// Default Garmin domain. `garmin.cn` is the China deployment.
pub const DEFAULT_DOMAIN: &str = "garmin.com";

/// Directory under the home directory where the token bundle lives.
///
/// Matches the location used by garth and garminconnect tooling, so
/// an existing login from those tools keeps working.
pub const TOKEN_DIR_NAME: &str = ".garminconnect";

/// File name of the persisted OAuth2 token bundle.
pub const OAUTH2_TOKEN_FILE: &str = "oauth2_token.json";

/// User agent Garmin's endpoints expect from Connect clients.
pub const USER_AGENT: &str = "com.garmin.android.apps.connectmobile";

/// Returns the Connect API base URL for a Garmin domain.
pub fn connect_api_url(domain: &str) -> String {
    format!("https://connectapi.{domain}")
}

/// Returns the SSO base URL for a Garmin domain.
pub fn sso_url(domain: &str) -> String {
    format!("https://sso.{domain}/sso")
}

/// Custom error type for Garmin Connect operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// No token bundle stored.
    #[error("Not logged in. Run 'vitals login' first.")]
    NotLoggedIn,

    /// Stored tokens exist but no longer grant access.
    #[error("Session expired or invalid: {0}. Run 'vitals login' to refresh it.")]
    SessionInvalid(String),

    /// The SSO flow rejected the login attempt.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Garmin Connect error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The service answered 2xx but the payload was not JSON.
    #[error("Invalid response payload: {0}")]
    Decode(String),

    /// Token bundle could not be read or written.
    #[error("Token storage error: {0}")]
    TokenStorage(String),

    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}
