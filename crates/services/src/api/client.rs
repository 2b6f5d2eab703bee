use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::AuthSession;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Authenticated JSON-over-HTTP client for the learning backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    auth: Arc<AuthSession>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig, auth: Arc<AuthSession>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.request_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config, auth })
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(self.config.endpoint(path));
        self.send(request).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.config.endpoint(path)).json(body);
        self.send(request).await
    }

    /// Attach the bearer token, send, and decode.
    ///
    /// A 401 clears the session before returning `ApiError::Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized`, `ApiError::HttpStatus` for other
    /// non-success codes, or `ApiError::Http` for transport/decoding failures.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.auth.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "api response");

        if status == StatusCode::UNAUTHORIZED {
            self.auth.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus {
                status,
                message: error_message(&body, status),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers a JSON `message` or `error` field, then the raw body, then the
/// status reason.
pub(crate) fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string()
}
