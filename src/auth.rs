use crate::client::Service;
use crate::error::Error;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
struct OAuthRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

/// OAuth token as returned by the provider's `/oauth/token` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Token {
    pub token_type: String,
    pub access_token: String,
    pub scope: String,
    pub expires_in: i64,
}

impl Service {
    /// Acquire an access token with the configured client credentials and
    /// store it for subsequent requests.
    ///
    /// The transport also calls this transparently when the provider reports
    /// `TOKEN_EXPIRED`, so concurrent workers may each trigger a refresh;
    /// the provider tolerates overlapping token grants.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let config = self.config();
        if config.client_id.is_empty() {
            return Err(Error::Config("client credentials are not configured".into()));
        }

        let body = OAuthRequest {
            client_id: &config.client_id,
            client_secret: config.client_secret.expose_secret(),
            audience: &config.base_url,
            grant_type: "client_credentials",
        };

        let token: Token = self.post_auth("/oauth/token", &body).await?;
        info!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "authenticated with provider"
        );
        self.store_token(token).await;
        Ok(())
    }
}
