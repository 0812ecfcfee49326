use eyre::Report;
use secrecy::SecretString;
use std::env;

pub const TOPUPS_URL: &str = "https://topups.reloadly.com";
pub const TOPUPS_SANDBOX_URL: &str = "https://topups-sandbox.reloadly.com";
pub const GIFTCARDS_URL: &str = "https://giftcards.reloadly.com";
pub const GIFTCARDS_SANDBOX_URL: &str = "https://giftcards-sandbox.reloadly.com";
pub const AUTH_URL: &str = "https://auth.reloadly.com";

pub const TOPUPS_ACCEPT: &str = "application/com.reloadly.topups-v1+json";
pub const GIFTCARDS_ACCEPT: &str = "application/com.reloadly.giftcards-v1+json";

/// Endpoints and credentials for one [`Service`](crate::Service).
///
/// The client secret is held behind [`SecretString`] and only exposed at the
/// point the OAuth request is built.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub giftcards_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ServiceConfig {
    /// Production endpoints with the given API credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: TOPUPS_URL.into(),
            giftcards_url: GIFTCARDS_URL.into(),
            auth_url: AUTH_URL.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Switch the top-up and gift-card hosts to the provider's sandbox.
    pub fn sandbox(mut self) -> Self {
        self.base_url = TOPUPS_SANDBOX_URL.into();
        self.giftcards_url = GIFTCARDS_SANDBOX_URL.into();
        self
    }

    /// Read credentials from `RELOADLY_ID` / `RELOADLY_SECRET`, switching to
    /// the sandbox when `RELOADLY_SANDBOX` is set to a truthy value.
    pub fn from_env() -> Result<Self, Report> {
        let client_id = env::var("RELOADLY_ID")
            .map_err(|_| eyre::eyre!("RELOADLY_ID is not set"))?;
        let client_secret = env::var("RELOADLY_SECRET")
            .map_err(|_| eyre::eyre!("RELOADLY_SECRET is not set"))?;

        let config = Self::new(client_id, client_secret);

        let sandbox = env::var("RELOADLY_SANDBOX")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(if sandbox { config.sandbox() } else { config })
    }
}
