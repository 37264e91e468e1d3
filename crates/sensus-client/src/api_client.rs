//! HTTP client for communicating with the census backend

use crate::error::{ClientError, ClientResult, ErrorSeverity};
use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use sensus_core::{config::ApiConfig, types::MessageResponse};
use serde::{Serialize, de::DeserializeOwned};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// API client for making HTTP requests to the census backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// Every request carries `Accept: application/json`, `X-Requested-With`
    /// and, when configured, a bearer token.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| {
            ClientError::configuration(format!("base URL '{}' is invalid: {e}", config.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::configuration("auth token contains characters not allowed in a header")
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!("sensus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request for a path relative to the base URL
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client.request(method, url)
    }

    /// Send a request, mapping transport failures and error statuses
    pub(crate) async fn send(&self, request: RequestBuilder, path: &str) -> ClientResult<Response> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if status.is_success() {
            debug!(%status, path, elapsed_ms, "backend responded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status, &body, path);
        match err.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => {
                warn!(%status, path, elapsed_ms, error = %err, "backend rejected request");
            }
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(%status, path, elapsed_ms, error = %err, "backend request failed");
            }
        }
        Err(err)
    }

    /// `GET` a JSON document
    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let response = self.send(request, path).await?;
        self.decode(response, path).await
    }

    /// Send a JSON body and decode the JSON reply
    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path).json(body);
        let response = self.send(request, path).await?;
        self.decode(response, path).await
    }

    /// `DELETE` a resource; a `{message}` reply is only logged
    pub(crate) async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.request(Method::DELETE, path);
        let response = self.send(request, path).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        if let Ok(reply) = serde_json::from_slice::<MessageResponse>(&bytes) {
            debug!(path, message = %reply.message, "resource deleted");
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, path: &str) -> ClientResult<T> {
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(path, error = %e, "unexpected response shape");
            ClientError::decode(format!("{path}: {e}"))
        })
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "backend request timed out");
            ClientError::timeout(self.timeout.as_secs())
        } else if err.is_connect() {
            warn!(error = %err, "backend unreachable");
            ClientError::network(err.to_string())
        } else if err.is_decode() || err.is_body() {
            ClientError::decode(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}
