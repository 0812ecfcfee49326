use crate::auth::Token;
use crate::config::{ServiceConfig, GIFTCARDS_ACCEPT, TOPUPS_ACCEPT};
use crate::error::Error;
use crate::giftcards::GiftCards;
use crate::topup::Topups;
use reqwest::header;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Which of the provider's hosts a request targets. The gift-card API lives
/// on its own host with its own media type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Host {
    Topups,
    GiftCards,
}

struct Inner {
    http: Client,
    config: ServiceConfig,
    token: RwLock<Option<Token>>,
}

/// The authenticated transport shared by every call into the provider.
///
/// Cloning is cheap (the HTTP pool, configuration and token are behind an
/// `Arc`), so one `Service` can back any number of concurrent workers. Only
/// the token is mutable; refreshing it under concurrency is at-least-once.
#[derive(Clone)]
pub struct Service {
    inner: Arc<Inner>,
}

/// Error body shape shared by every provider endpoint. All fields are
/// optional on the wire; a response only counts as an error when it carries
/// a non-empty `errorCode`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ErrorResponse {
    error_code: Option<String>,
    message: Option<String>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("base_url", &self.inner.config.base_url)
            .finish_non_exhaustive()
    }
}

impl Service {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                config,
                token: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// A fresh top-up builder. Builders are owned values; construct one per
    /// job and never share it across workers.
    pub fn topups(&self) -> Topups {
        Topups::new(self.clone())
    }

    /// The gift-card sub-API, bound to the gift-card host.
    pub fn giftcards(&self) -> GiftCards {
        GiftCards::new(self.clone())
    }

    pub(crate) async fn store_token(&self, token: Token) {
        *self.inner.token.write().await = Some(token);
    }

    fn url(&self, host: Host, path: &str) -> String {
        let base = match host {
            Host::Topups => &self.inner.config.base_url,
            Host::GiftCards => &self.inner.config.giftcards_url,
        };
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    fn accept(host: Host) -> &'static str {
        match host {
            Host::Topups => TOPUPS_ACCEPT,
            Host::GiftCards => GIFTCARDS_ACCEPT,
        }
    }

    /// GET with token-expiry recovery: one transparent re-authentication and
    /// replay before the failure surfaces.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        host: Host,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        match self.try_get(host, path, query).await {
            Err(err) if err.is_token_expired() => {
                info!(path, "access token expired, re-authenticating");
                self.authenticate().await?;
                self.try_get(host, path, query).await
            }
            result => result,
        }
    }

    /// POST with the same token-expiry recovery as [`Self::get_json`].
    pub(crate) async fn post_json<B, T>(&self, host: Host, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.try_post(host, path, body).await {
            Err(err) if err.is_token_expired() => {
                info!(path, "access token expired, re-authenticating");
                self.authenticate().await?;
                self.try_post(host, path, body).await
            }
            result => result,
        }
    }

    /// POST against the auth host. No Authorization header and no expiry
    /// recovery; this is how tokens are obtained in the first place.
    pub(crate) async fn post_auth<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!(
            "{}{}",
            self.inner.config.auth_url.trim_end_matches('/'),
            path
        );
        let response = self.inner.http.post(url).json(body).send().await?;
        decode_response(response).await
    }

    async fn try_get<T: DeserializeOwned>(
        &self,
        host: Host,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let mut request = self
            .inner
            .http
            .get(self.url(host, path))
            .header(header::ACCEPT, Self::accept(host));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(auth) = self.authorization().await {
            request = request.header(header::AUTHORIZATION, auth);
        }
        let response = request.send().await?;
        decode_response(response).await
    }

    async fn try_post<B, T>(&self, host: Host, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .inner
            .http
            .post(self.url(host, path))
            .header(header::ACCEPT, Self::accept(host))
            .json(body);
        if let Some(auth) = self.authorization().await {
            request = request.header(header::AUTHORIZATION, auth);
        }
        let response = request.send().await?;
        decode_response(response).await
    }

    async fn authorization(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .await
            .as_ref()
            .map(|t| format!("{} {}", t.token_type, t.access_token))
    }
}

/// Decode a provider response into `T`, surfacing provider errors.
///
/// A body carrying a non-empty `errorCode` is a provider error regardless of
/// status. A non-success status without a decodable error code is mapped to
/// a provider error whose code is the numeric status, so callers always see
/// one error shape.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let status = response.status();
    let body = response.text().await?;

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
        if let Some(code) = err.error_code.filter(|c| !c.is_empty()) {
            let message = err.message.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                error_code = %code,
                %message,
                "provider reported an error"
            );
            return Err(Error::Api {
                status: status.as_u16(),
                error_code: code,
                message,
            });
        }
    }

    if status.as_u16() >= 300 {
        return Err(Error::Api {
            status: status.as_u16(),
            error_code: status.as_u16().to_string(),
            message: format!("Non-200 Status Code: {}", status.as_u16()),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::Http(format!("could not decode response body: {}", e)))
}
