//! # Application Events
//!
//! Events published by background tasks and stores. A front end drains the
//! receiving side of the channel created by [`event_channel`].

use async_channel::{Receiver, Sender};

/// Route of the login screen; a session expiry seen there does not redirect.
pub const LOGIN_ROUTE: &str = "/login";

/// Connection state of the notification push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Gave up after repeated connection failures
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Refresh token rejected; stored tokens were cleared.
    SessionExpired { redirect_to_login: bool },
    /// Authenticated user changed (`None` after logout)
    SessionChanged { user_id: Option<String> },
    /// Notification list or unread counter changed
    NotificationsUpdated { unread: u64 },
    /// Push channel status
    PushStatus(PushState),
    /// A list controller finished loading
    ListRefreshed { source: &'static str, total: u64 },
    /// Status line text for the front end
    Loading(String),
}

/// Unbounded application event bus.
pub fn event_channel() -> (Sender<AppEvent>, Receiver<AppEvent>) {
    async_channel::unbounded()
}

/// Publish without awaiting; a closed bus only means nobody is listening.
pub(crate) fn publish(tx: Option<&Sender<AppEvent>>, event: AppEvent) {
    if let Some(tx) = tx {
        if let Err(e) = tx.try_send(event) {
            tracing::trace!(error = %e, "Event bus closed, dropping event");
        }
    }
}
