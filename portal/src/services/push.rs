//! # Notification Push Channel
//!
//! WebSocket client for real-time notification events.
//!
//! Frames are JSON objects `{"event": "...", "data": ...}` (see [`shared::PushEvent`]).
//! Parsed events are applied to the [`NotificationStore`]. Unknown events are
//! logged and skipped.
//!
//! Reconnects with exponential backoff (1s doubling up to 60s). After
//! [`MAX_CONNECTION_ATTEMPTS`] consecutive failures the channel gives up and
//! reports [`PushState::Disabled`]; a successful connection resets the count.

use crate::app::events::{publish, AppEvent, PushState};
use crate::app::notifications::{NotificationStore, PushConnector};
use crate::services::token_store::TokenStore;
use async_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use shared::PushEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

/// Maximum number of consecutive connection failures before giving up
pub const MAX_CONNECTION_ATTEMPTS: u32 = 5;
const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// One push channel connection loop for the current access token.
pub struct PushChannel {
    url: String,
    tokens: Arc<dyn TokenStore>,
    store: Arc<NotificationStore>,
    events: Option<Sender<AppEvent>>,
    initial_delay: Duration,
    max_delay: Duration,
}

impl PushChannel {
    pub fn new(url: impl Into<String>, tokens: Arc<dyn TokenStore>, store: Arc<NotificationStore>) -> Self {
        Self {
            url: url.into(),
            tokens,
            store,
            events: None,
            initial_delay: INITIAL_RECONNECT_DELAY,
            max_delay: MAX_RECONNECT_DELAY,
        }
    }

    pub fn with_events(mut self, tx: Option<Sender<AppEvent>>) -> Self {
        self.events = tx;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    /// Connect and pump events until the channel gives up or the task is aborted.
    pub async fn run(self) {
        let mut reconnect_delay = self.initial_delay;
        let mut failures = 0u32;

        self.status(PushState::Connecting);

        loop {
            let Some(token) = self.tokens.access_token() else {
                info!("No access token, push channel not started");
                self.status(PushState::Disconnected);
                return;
            };

            match self.connect(&token).await {
                Ok(received) => {
                    failures = 0;
                    reconnect_delay = self.initial_delay;
                    warn!(received, "Push connection lost, reconnecting");
                }
                Err(e) => {
                    failures += 1;
                    error!(
                        url = %self.url,
                        error = %e,
                        attempt = failures,
                        max_attempts = MAX_CONNECTION_ATTEMPTS,
                        "Failed to connect to notification push channel"
                    );
                    if failures >= MAX_CONNECTION_ATTEMPTS {
                        error!(
                            attempts = failures,
                            "Maximum connection attempts reached. Disabling push notifications."
                        );
                        self.status(PushState::Disabled);
                        publish(
                            self.events.as_ref(),
                            AppEvent::Loading(format!(
                                "Live notifications unavailable after {} attempts",
                                MAX_CONNECTION_ATTEMPTS
                            )),
                        );
                        return;
                    }
                }
            }

            self.status(PushState::Reconnecting);
            info!(delay_ms = reconnect_delay.as_millis() as u64, "Reconnecting push channel");
            sleep(reconnect_delay).await;
            reconnect_delay = (reconnect_delay * 2).min(self.max_delay);
        }
    }

    /// One connection: returns the number of events applied once the server closes it.
    async fn connect(&self, token: &str) -> Result<u64, tokio_tungstenite::tungstenite::Error> {
        let mut request = self.url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| tokio_tungstenite::tungstenite::Error::HttpFormat(e.into()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (ws_stream, response) = connect_async(request).await?;
        info!(url = %self.url, status = ?response.status(), "Push channel connected");
        self.status(PushState::Connected);

        let (mut write, mut read) = ws_stream.split();
        let mut received = 0u64;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<PushEvent>(&text) {
                    Ok(event) => {
                        received += 1;
                        self.store.apply(event);
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            message_preview = %preview(&text),
                            "Ignoring unrecognised push frame"
                        );
                    }
                },
                Ok(Message::Ping(data)) => {
                    trace!(data_len = data.len(), "Received ping, sending pong");
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        error!(error = %e, "Failed to send pong response");
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(
                        code = ?frame.as_ref().map(|f| f.code),
                        received,
                        "Push channel closed by server"
                    );
                    break;
                }
                Ok(_) => trace!("Ignoring non-text push frame"),
                Err(e) => {
                    error!(error = %e, received, "Push channel read error");
                    break;
                }
            }
        }

        Ok(received)
    }

    fn status(&self, state: PushState) {
        debug!(state = ?state, "Push channel status");
        publish(self.events.as_ref(), AppEvent::PushStatus(state));
    }
}

fn preview(text: &str) -> String {
    if text.len() > 100 {
        let cut = (0..=100).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}

/// Spawns a [`PushChannel`] per authenticated user.
pub struct WsPushConnector {
    url: String,
    tokens: Arc<dyn TokenStore>,
    events: Option<Sender<AppEvent>>,
}

impl WsPushConnector {
    pub fn new(url: impl Into<String>, tokens: Arc<dyn TokenStore>, events: Option<Sender<AppEvent>>) -> Self {
        Self {
            url: url.into(),
            tokens,
            events,
        }
    }
}

impl PushConnector for WsPushConnector {
    fn spawn(&self, user_id: &str, store: Arc<NotificationStore>) -> JoinHandle<()> {
        info!(user_id = %user_id, url = %self.url, "Starting notification push channel");
        let channel = PushChannel::new(self.url.clone(), self.tokens.clone(), store)
            .with_events(self.events.clone());
        tokio::spawn(channel.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::notifications::tests::MockNotifications;
    use crate::services::token_store::MemoryTokenStore;
    use axum::extract::ws::{Message as WsMessage, WebSocketUpgrade};
    use axum::http::HeaderMap;
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use parking_lot::Mutex;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("ws://{}/api/ws/notifications", addr)
    }

    fn empty_store() -> Arc<NotificationStore> {
        Arc::new(NotificationStore::new(Arc::new(MockNotifications::new(Vec::new())), 20))
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "é".repeat(80);
        let short = preview(&text);
        assert!(short.ends_with("..."));
        assert!(short.len() <= 103);
    }

    #[tokio::test]
    async fn test_push_frames_reach_the_store() {
        let seen_auth = Arc::new(Mutex::new(None::<String>));
        let seen = seen_auth.clone();
        let router = Router::new().route(
            "/api/ws/notifications",
            get(move |headers: HeaderMap, ws: WebSocketUpgrade| {
                let seen = seen.clone();
                async move {
                    *seen.lock() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let response: Response = ws.on_upgrade(|mut socket| async move {
                        let frames = [
                            r#"{"event":"notification","data":{"id":"n1","type":"DEPOSIT","title":"Deposit approved","message":"Your deposit was approved","isRead":false,"createdAt":"2024-05-01T10:00:00Z"}}"#,
                            r#"{"event":"something:else","data":{}}"#,
                            r#"{"event":"notification:read","data":{"id":"n1","isRead":true}}"#,
                        ];
                        for frame in frames {
                            if socket.send(WsMessage::Text(frame.into())).await.is_err() {
                                return;
                            }
                        }
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    });
                    response
                }
            }),
        );
        let url = serve(router).await;

        let store = empty_store();
        let tokens = Arc::new(MemoryTokenStore::with_tokens("access-1", "refresh-1"));
        let (tx, rx) = crate::app::events::event_channel();
        let channel = PushChannel::new(url, tokens, store.clone()).with_events(Some(tx));
        let handle = tokio::spawn(channel.run());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let items = store.items();
            if items.len() == 1 && items[0].is_read {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "push events not applied");
            sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert_eq!(store.unread_count(), 0);
        assert_eq!(seen_auth.lock().as_deref(), Some("Bearer access-1"));

        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::PushStatus(state) = event {
                states.push(state);
            }
        }
        assert_eq!(states[..2], [PushState::Connecting, PushState::Connected]);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tokens = Arc::new(MemoryTokenStore::with_tokens("access-1", "refresh-1"));
        let (tx, rx) = crate::app::events::event_channel();
        let channel = PushChannel::new(format!("ws://{}/api/ws/notifications", addr), tokens, empty_store())
            .with_events(Some(tx))
            .with_backoff(Duration::from_millis(1), Duration::from_millis(4));

        tokio::time::timeout(Duration::from_secs(5), channel.run())
            .await
            .expect("channel should give up");

        let mut last_state = None;
        let mut reconnects = 0;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::PushStatus(state) = event {
                if state == PushState::Reconnecting {
                    reconnects += 1;
                }
                last_state = Some(state);
            }
        }
        assert_eq!(last_state, Some(PushState::Disabled));
        assert_eq!(reconnects, MAX_CONNECTION_ATTEMPTS - 1);
    }

    #[tokio::test]
    async fn test_no_token_means_no_connection() {
        let (tx, rx) = crate::app::events::event_channel();
        let channel = PushChannel::new("ws://127.0.0.1:9/unused", Arc::new(MemoryTokenStore::new()), empty_store())
            .with_events(Some(tx));

        channel.run().await;

        let mut states = Vec::new();
        while let Ok(AppEvent::PushStatus(state)) = rx.try_recv() {
            states.push(state);
        }
        assert_eq!(states, vec![PushState::Connecting, PushState::Disconnected]);
    }
}
