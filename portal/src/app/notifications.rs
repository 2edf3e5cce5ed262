//! # Notification Store
//!
//! In-memory notification list (newest first) and unread counter.
//!
//! The list is populated once with the most recent N notifications; after that
//! it is kept current by push events applied locally, without re-fetching.
//! Local actions (mark read, mark all read, delete) patch the list first and
//! then call the API; a failed call re-loads the authoritative state.
//!
//! [`NotificationHub`] ties the push channel to the session: it connects when a
//! user logs in, disconnects on logout and reconnects when the user changes.

use crate::app::events::{publish, AppEvent};
use crate::core::error::Result;
use crate::core::service::NotificationService;
use async_channel::Sender;
use parking_lot::RwLock;
use shared::{DeletedNotification, Notification, PushEvent, ReadStatusChange};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Snapshot of the notification list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    /// Newest first
    pub items: Vec<Notification>,
    pub unread: u64,
    pub error: Option<String>,
}

impl NotificationState {
    /// Apply a push event (or the equivalent local action) to the list.
    pub fn apply(&mut self, event: PushEvent) {
        match event {
            PushEvent::Created(notification) => {
                if self.items.iter().any(|n| n.id == notification.id) {
                    return;
                }
                if !notification.is_read {
                    self.unread += 1;
                }
                self.items.insert(0, notification);
            }
            PushEvent::Read(ReadStatusChange { id, is_read }) => {
                let Some(item) = self.items.iter_mut().find(|n| n.id == id) else {
                    return;
                };
                if item.is_read == is_read {
                    return;
                }
                item.is_read = is_read;
                if is_read {
                    self.unread = self.unread.saturating_sub(1);
                } else {
                    self.unread += 1;
                }
            }
            PushEvent::AllRead => {
                for item in &mut self.items {
                    item.is_read = true;
                }
                self.unread = 0;
            }
            PushEvent::Deleted(DeletedNotification { id }) => {
                if let Some(pos) = self.items.iter().position(|n| n.id == id) {
                    let removed = self.items.remove(pos);
                    if !removed.is_read {
                        self.unread = self.unread.saturating_sub(1);
                    }
                }
            }
        }
    }
}

pub struct NotificationStore {
    state: RwLock<NotificationState>,
    api: Arc<dyn NotificationService>,
    events: Option<Sender<AppEvent>>,
    limit: u32,
}

impl NotificationStore {
    pub fn new(api: Arc<dyn NotificationService>, limit: u32) -> Self {
        Self {
            state: RwLock::new(NotificationState::default()),
            api,
            events: None,
            limit,
        }
    }

    pub fn with_events(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn snapshot(&self) -> NotificationState {
        self.state.read().clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.state.read().unread
    }

    pub fn items(&self) -> Vec<Notification> {
        self.state.read().items.clone()
    }

    /// Fetch the most recent notifications and the unread count.
    pub async fn load(&self) -> Result<()> {
        let result = async {
            let items = self.api.list_notifications(self.limit).await?;
            let unread = self.api.unread_count().await?;
            Ok::<_, crate::core::error::PortalError>((items, unread))
        }
        .await;

        match result {
            Ok((items, unread)) => {
                tracing::debug!(count = items.len(), unread, "Notifications loaded");
                {
                    let mut state = self.state.write();
                    state.items = items;
                    state.unread = unread;
                    state.error = None;
                }
                self.notify();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load notifications");
                self.state.write().error = Some(e.user_message("Failed to load notifications"));
                Err(e)
            }
        }
    }

    /// Apply a push channel event.
    pub fn apply(&self, event: PushEvent) {
        tracing::debug!(event = ?event_name(&event), "Applying notification event");
        self.state.write().apply(event);
        self.notify();
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.apply(PushEvent::Read(ReadStatusChange {
            id: id.to_string(),
            is_read: true,
        }));
        let result = self.api.mark_read(id).await;
        self.reconcile(result).await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.apply(PushEvent::AllRead);
        let result = self.api.mark_all_read().await;
        self.reconcile(result).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.apply(PushEvent::Deleted(DeletedNotification { id: id.to_string() }));
        let result = self.api.delete_notification(id).await;
        self.reconcile(result).await
    }

    /// Drop everything (logout).
    pub fn clear(&self) {
        *self.state.write() = NotificationState::default();
        self.notify();
    }

    /// On a failed mutation the optimistic patch is replaced by a fresh load.
    async fn reconcile(&self, result: Result<()>) -> Result<()> {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Notification update failed, reloading");
            if let Err(reload) = self.load().await {
                tracing::warn!(error = %reload, "Reload after failed update also failed");
            }
            return Err(e);
        }
        Ok(())
    }

    fn notify(&self) {
        let unread = self.state.read().unread;
        publish(self.events.as_ref(), AppEvent::NotificationsUpdated { unread });
    }
}

/// Starts the background push task for a user.
pub trait PushConnector: Send + Sync {
    fn spawn(&self, user_id: &str, store: Arc<NotificationStore>) -> JoinHandle<()>;
}

struct ActiveChannel {
    user_id: String,
    handle: JoinHandle<()>,
}

/// Push channel lifecycle, driven by session changes.
pub struct NotificationHub {
    store: Arc<NotificationStore>,
    connector: Box<dyn PushConnector>,
    active: parking_lot::Mutex<Option<ActiveChannel>>,
}

impl NotificationHub {
    pub fn new(store: Arc<NotificationStore>, connector: Box<dyn PushConnector>) -> Self {
        Self {
            store,
            connector,
            active: parking_lot::Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// User the channel is currently open for.
    pub fn connected_user(&self) -> Option<String> {
        self.active
            .lock()
            .as_ref()
            .filter(|active| !active.handle.is_finished())
            .map(|active| active.user_id.clone())
    }

    /// Follow the session: `Some(user)` connects (or reconnects for a different
    /// user, dropping the previous list first), `None` disconnects and clears it.
    pub async fn on_session(&self, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            self.disconnect();
            self.store.clear();
            return;
        };

        if self.connected_user().as_deref() == Some(user_id) {
            return;
        }
        // Nothing from a previous account may survive a failed load.
        self.disconnect();
        self.store.clear();

        if let Err(e) = self.store.load().await {
            tracing::warn!(error = %e, "Initial notification load failed");
        }

        let handle = self.connector.spawn(user_id, self.store.clone());
        let previous = self.active.lock().replace(ActiveChannel {
            user_id: user_id.to_string(),
            handle,
        });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    pub fn disconnect(&self) {
        if let Some(active) = self.active.lock().take() {
            tracing::info!(user_id = %active.user_id, "Closing notification push channel");
            active.handle.abort();
        }
    }
}

impl Drop for NotificationHub {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn event_name(event: &PushEvent) -> &'static str {
    match event {
        PushEvent::Created(_) => "notification",
        PushEvent::Read(_) => "notification:read",
        PushEvent::AllRead => "notifications:all-read",
        PushEvent::Deleted(_) => "notification:deleted",
    }
}
