use ecocharge_types::{AdminSession, FormError};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::cooldown;
use crate::error::ClientError;
use crate::session::{FileSessionStore, SessionStore};

/// Handle to the EcoCharge API. Cheap to clone.
#[derive(Clone)]
pub struct EcoChargeClient {
    http: Client,
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
}

impl EcoChargeClient {
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        config.check()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ecocharge-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config, store })
    }

    /// Client backed by `session.json` in the configured data directory.
    pub fn with_file_store(config: ClientConfig) -> Result<Self, ClientError> {
        let store = Arc::new(FileSessionStore::new(config.session_path()));
        Self::new(config, store)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Cached admin session, if any.
    pub fn session(&self) -> Result<Option<AdminSession>, ClientError> {
        self.store.load_session()
    }

    pub fn is_logged_in(&self) -> Result<bool, ClientError> {
        Ok(self.session()?.is_some())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        session: Option<&AdminSession>,
    ) -> Result<Response, ClientError> {
        tracing::debug!(%method, path, authorized = session.is_some(), "API request");
        let mut request = self.http.request(method, self.url(path));
        if let Some(session) = session {
            request = request.header(reqwest::header::AUTHORIZATION, session.bearer());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::Connection(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })
    }

    /// Unauthenticated call; any non-success status becomes an error.
    pub(crate) async fn public<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<R, ClientError> {
        let resp = self.send(method, path, body, None).await?;
        read_json(resp).await
    }

    /// Unauthenticated call returning the raw response for callers that
    /// map specific statuses themselves.
    pub(crate) async fn public_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        self.send(method, path, body, None).await
    }

    /// Call with the cached bearer token.
    ///
    /// A 401/403 is retried once with the session re-read from the store.
    /// A second rejection clears the session and yields
    /// [`ClientError::SessionExpired`].
    pub(crate) async fn authorized<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<R, ClientError> {
        let session = self.store.load_session()?.ok_or(ClientError::NotAuthenticated)?;
        let resp = self.send(method.clone(), path, body, Some(&session)).await?;
        if !is_unauthorized(resp.status()) {
            return read_json(resp).await;
        }

        tracing::debug!(path, status = %resp.status(), "Unauthorized, retrying once");
        let session = self.store.load_session()?.ok_or(ClientError::SessionExpired)?;
        let resp = self.send(method, path, body, Some(&session)).await?;
        if is_unauthorized(resp.status()) {
            tracing::warn!(path, status = %resp.status(), "Token rejected twice, logging out");
            self.store.clear_session()?;
            return Err(ClientError::SessionExpired);
        }
        read_json(resp).await
    }
}

const fn is_unauthorized(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Decode a successful body, or turn a failed one into a [`ClientError`].
pub(crate) async fn read_json<R: DeserializeOwned>(resp: Response) -> Result<R, ClientError> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(error_from_parts(status, &headers, &text));
    }

    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))?
    };
    serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

pub(crate) fn error_from_parts(status: StatusCode, headers: &HeaderMap, body: &str) -> ClientError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ClientError::RateLimited { retry_after: retry_after(headers) };
    }
    ClientError::Api { status: status.as_u16(), message: error_message(status, body) }
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| cooldown::parse_retry_after(s, chrono::Utc::now()))
}

/// Message to show for a failed call: the API's `message`/`error` field,
/// else the raw body, else the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = ["message", "error", "msg"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
        {
            return msg.to_string();
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 300 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or("Request failed").to_string()
}

/// Acknowledgement text from a `{ "message": ... }` body.
pub(crate) fn ack_message(value: &Value, fallback: &str) -> String {
    value.get("message").and_then(Value::as_str).unwrap_or(fallback).to_string()
}

/// Pull a list out of `[...]`, `{key: [...]}` or `{data: [...]}`.
pub(crate) fn unwrap_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, ClientError> {
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove(key)
            .or_else(|| map.remove("data"))
            .ok_or_else(|| ClientError::InvalidResponse(format!("expected a list under '{}'", key)))?,
        Value::Null => Value::Array(Vec::new()),
        other => {
            return Err(ClientError::InvalidResponse(format!("expected a list, got {}", other)))
        },
    };
    serde_json::from_value(list).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pull a record out of `{...}`, `{key: {...}}` or `{data: {...}}`.
pub(crate) fn unwrap_object<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    [value.get(key), value.get("data"), Some(value)]
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_value(candidate.clone()).ok())
}

/// `prefix` with `segment` appended as a single percent-encoded path segment.
pub(crate) fn path_with_segment(prefix: &str, segment: &str) -> Result<String, ClientError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(FormError::new("id", "Record id is required").into());
    }
    let mut url = url::Url::parse("http://localhost/")
        .map_err(|e| ClientError::Config(e.to_string()))?;
    url.set_path(prefix);
    url.path_segments_mut()
        .map_err(|()| ClientError::Config("URL cannot carry a path".to_string()))?
        .push(segment);
    Ok(url.path().to_string())
}

/// Id assigned by the API in a create response.
pub(crate) fn created_id(value: &Value) -> Option<String> {
    let id = ["id", "_id", "insertId"]
        .iter()
        .find_map(|key| value.get(*key).or_else(|| value.get("data").and_then(|d| d.get(*key))))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
