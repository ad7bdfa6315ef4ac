//! Consumer for the real-time change feed.
//!
//! The feed is served as Server-Sent Events at `{feed_base}/{collection}`;
//! every event's `data` is a JSON change notification. Keep-alive events
//! (`ping`, or empty data) are skipped.

use ecocharge_types::{ChangeEvent, Collection, ListChange, LiveList, Record};
use eventsource_stream::Eventsource;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::client::read_json;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

/// Stream of change notifications for one collection.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, ClientError>>;

/// Subscriber to the change feed.
#[derive(Clone)]
pub struct ChangeFeed {
    http: Client,
    base: String,
    token: Option<String>,
}

impl ChangeFeed {
    /// Feed client for `config`. The stream is long-lived, so only the
    /// connect phase is bounded by the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, base: config.feed_base(), token: None })
    }

    /// Attach the cached admin token, if any, to the subscription request.
    pub fn with_session(mut self, store: &dyn SessionStore) -> Result<Self, ClientError> {
        self.token = store.load_session()?.map(|s| s.token);
        Ok(self)
    }

    /// Open the feed for `collection`.
    pub async fn subscribe(&self, collection: Collection) -> Result<ChangeStream, ClientError> {
        let url = format!("{}/{}", self.base, collection.as_str());
        tracing::info!(%collection, "Subscribing to change feed");

        let mut request = self.http.get(&url).header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await.map_err(|e| ClientError::Connection(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_json::<Value>(resp)
                .await
                .err()
                .unwrap_or_else(|| ClientError::Stream("feed rejected subscription".into())));
        }

        let stream = resp.bytes_stream().eventsource().filter_map(move |item| async move {
            match item {
                Ok(event) => parse_feed_event(&event.event, &event.data, collection),
                Err(e) => Some(Err(ClientError::Stream(e.to_string()))),
            }
        });
        Ok(stream.boxed())
    }

    /// Open the feed for `T`'s collection, then load the initial snapshot.
    ///
    /// Events pushed while the snapshot request is in flight wait on the
    /// stream and are applied afterwards; replaying ones the snapshot already
    /// reflects leaves the list unchanged.
    pub async fn subscribe_live<T, S>(
        &self,
        snapshot: S,
    ) -> Result<(LiveList<T>, ChangeStream), ClientError>
    where
        T: Record,
        S: Future<Output = Result<Vec<T>, ClientError>>,
    {
        let stream = self.subscribe(T::COLLECTION).await?;
        let list = LiveList::from_snapshot(snapshot.await?);
        Ok((list, stream))
    }
}

/// Turn one SSE event into a change notification.
///
/// Returns `None` for keep-alives. A payload without a `collection` field is
/// attributed to the subscribed collection.
pub fn parse_feed_event(
    name: &str,
    data: &str,
    collection: Collection,
) -> Option<Result<ChangeEvent, ClientError>> {
    let data = data.trim();
    if name == "ping" || data.is_empty() {
        return None;
    }

    let mut value: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(ClientError::BadEvent(e.to_string()))),
    };
    if let Value::Object(map) = &mut value {
        map.entry("collection").or_insert_with(|| Value::String(collection.as_str().to_string()));
        let named = !name.is_empty() && name != "message";
        if named && !map.contains_key("type") && !map.contains_key("kind") {
            map.insert("type".to_string(), Value::String(name.to_string()));
        }
    }

    Some(
        serde_json::from_value(value)
            .map_err(|e| ClientError::BadEvent(e.to_string())),
    )
}

/// Apply every event from `stream` to `list`, reporting each change.
///
/// Malformed or undecodable events are logged and skipped. Returns when the
/// stream ends or on the first transport error.
pub async fn watch<T, F>(
    mut stream: ChangeStream,
    list: &mut LiveList<T>,
    mut on_change: F,
) -> Result<(), ClientError>
where
    T: Record,
    F: FnMut(&ListChange, &LiveList<T>),
{
    while let Some(item) = stream.next().await {
        let event = match item {
            Ok(event) => event,
            Err(ClientError::BadEvent(msg)) => {
                tracing::warn!("Skipping change event: {}", msg);
                continue;
            },
            Err(e) => return Err(e),
        };
        match list.apply(&event) {
            Ok(change) => on_change(&change, list),
            Err(e) => tracing::warn!(id = %event.id, "Skipping change event: {}", e),
        }
    }
    tracing::info!("Change feed closed");
    Ok(())
}
