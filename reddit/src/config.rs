//! Reddit API credentials.

use modgate_platform::PlatformError;

/// Credentials for the script-type Reddit application the bot runs as.
///
/// Read from the environment rather than the config file so secrets stay out
/// of version-controlled TOML.
#[derive(Clone, Debug)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl RedditConfig {
    /// Load credentials from `MODGATE_CLIENT_ID`, `MODGATE_CLIENT_SECRET`,
    /// `MODGATE_USERNAME`, and `MODGATE_PASSWORD`.
    pub fn from_env() -> Result<Self, PlatformError> {
        Ok(Self {
            client_id: require_env("MODGATE_CLIENT_ID")?,
            client_secret: require_env("MODGATE_CLIENT_SECRET")?,
            username: require_env("MODGATE_USERNAME")?,
            password: require_env("MODGATE_PASSWORD")?,
        })
    }
}

fn require_env(name: &str) -> Result<String, PlatformError> {
    std::env::var(name).map_err(|_| PlatformError::Auth(format!("{name} is not set")))
}
