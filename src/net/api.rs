//! Auth gateway: stateless HTTP wrapper over the auth-service endpoints.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, each raced against
//! the configured request timeout.
//! Server-side / native tests: requests fail with a network error since these
//! endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every non-success status is turned into a structured `ApiError` carrying the
//! status code and parsed body. Nothing is retried, cached or swallowed here;
//! the session store decides what a failure means.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{AuthResponse, Credentials, HealthStatus, ProfileResponse, Registration, UserProfile};
use crate::config::AuthConfig;

pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGIN_PATH: &str = "/auth/login";
pub const PROFILE_PATH: &str = "/users/userinfo";
pub const HEALTH_PATH: &str = "/health";

/// The three round trips the session store depends on.
///
/// Futures are `?Send`: the browser runtime is single-threaded and `gloo-net`
/// futures hold JS handles.
#[async_trait::async_trait(?Send)]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/register`.
    async fn register(&self, data: &Registration) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// `GET /users/userinfo` with `Authorization: Bearer <token>`.
    async fn get_profile(&self, token: &str) -> Result<UserProfile, ApiError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// Production gateway bound to a configured base address.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    config: AuthConfig,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Probe `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns the normalized error when the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.send::<(), HealthStatus>(Method::Get, HEALTH_PATH, None, None).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        #[cfg(feature = "hydrate")]
        {
            let result = with_timeout(fetch(method, &url, body, token), self.config.request_timeout).await;
            if let Err(e) = &result {
                log::warn!("auth request {path} failed: status={:?} error={e}", e.status());
            }
            result
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (method, body, token);
            log::debug!("auth request to {url} skipped outside the browser");
            Err(ApiError::network("not available on server"))
        }
    }
}

#[async_trait::async_trait(?Send)]
impl AuthApi for HttpAuthApi {
    async fn register(&self, data: &Registration) -> Result<AuthResponse, ApiError> {
        self.send(Method::Post, REGISTER_PATH, Some(data), None).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send(Method::Post, LOGIN_PATH, Some(credentials), None).await
    }

    async fn get_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        let resp: ProfileResponse = self.send::<(), _>(Method::Get, PROFILE_PATH, None, Some(token)).await?;
        Ok(resp.user)
    }
}

fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Headers attached to every request; the bearer credential only when a token is supplied.
fn request_headers(token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = vec![("Content-Type", "application/json".to_owned())];
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("Authorization", bearer_header(token)));
    }
    headers
}

/// Map a completed HTTP exchange to a typed body or a normalized error.
fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::from_status(status, body));
    }
    serde_json::from_str(body).map_err(|e| ApiError::Server {
        status,
        message: format!("invalid response body: {e}"),
        body: serde_json::Value::Null,
    })
}

#[cfg(any(test, feature = "hydrate"))]
fn timeout_message(timeout: std::time::Duration) -> String {
    format!("request timed out after {}s", timeout.as_secs())
}

#[cfg(feature = "hydrate")]
async fn fetch<B, T>(method: Method, url: &str, body: Option<&B>, token: Option<&str>) -> Result<T, ApiError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut builder = match method {
        Method::Get => gloo_net::http::Request::get(url),
        Method::Post => gloo_net::http::Request::post(url),
    };
    for (name, value) in request_headers(token) {
        builder = builder.header(name, &value);
    }
    let sent = match body {
        Some(body) => builder
            .json(body)
            .map_err(|e| ApiError::network(e.to_string()))?
            .send()
            .await,
        None => builder.send().await,
    };
    let resp = sent.map_err(|e| ApiError::network(e.to_string()))?;
    let status = resp.status();
    let text = resp.text().await.map_err(|e| ApiError::network(e.to_string()))?;
    decode_response(status, &text)
}

#[cfg(feature = "hydrate")]
async fn with_timeout<F, T>(request: F, timeout: Option<std::time::Duration>) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    use futures::future::Either;

    let Some(timeout) = timeout else {
        return request.await;
    };
    let request = std::pin::pin!(request);
    let deadline = std::pin::pin!(gloo_timers::future::sleep(timeout));
    match futures::future::select(request, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(ApiError::network(timeout_message(timeout))),
    }
}
