//! # Application Orchestrator
//!
//! The [`Portal`] struct wires the API client, the stores and the push channel
//! together and keeps them consistent with the session.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Front end (CLI, UI)                                         │
//! │   - calls Portal::login / logout / stores / forms            │
//! │   - drains Portal::event_rx, passes events to handle_event   │
//! └──────────────┬───────────────────────────────▲───────────────┘
//!                │                               │ AppEvent
//! ┌──────────────▼───────────────────────────────┴───────────────┐
//! │  Portal                                                      │
//! │   SessionStore ── NotificationHub ── NotificationStore       │
//! │        │               │ (push task)                         │
//! │        │          HoldingsStore ── RefreshTimer              │
//! └────────┼───────────────┼─────────────────────────────────────┘
//!          ▼               ▼
//!      ApiClient      PushChannel (WebSocket)
//! ```
//!
//! Stores are `Arc`-shared and internally locked (`parking_lot::RwLock`);
//! locks are never held across an `.await`.
//!
//! ## Event-Driven Communication
//!
//! Background work reports through the [`AppEvent`] bus:
//!
//! ```rust,ignore
//! while let Ok(event) = portal.event_rx.try_recv() {
//!     portal.handle_event(&event);
//!     render(&event);
//! }
//! ```
//!
//! ## Related Modules
//!
//! - [`session`]: authenticated user lifecycle
//! - [`notifications`]: notification list, unread counter, push lifecycle
//! - [`forms`]: form state machines with field validation
//! - [`trade`]: buy/sell wizard and preview scheduling
//! - [`listing`]: paginated admin and history lists
//! - [`holdings`]: owned investments and portfolios
//! - [`refresh`]: periodic background refresh

pub mod events;
pub mod forms;
pub mod holdings;
pub mod listing;
pub mod notifications;
pub mod refresh;
pub mod session;
pub mod trade;

pub use events::{event_channel, AppEvent, PushState};
pub use holdings::HoldingsStore;
pub use notifications::{NotificationHub, NotificationStore};
pub use session::{SessionState, SessionStore};

use crate::config::PortalConfig;
use crate::core::error::Result;
use crate::services::api::ApiClient;
use crate::services::push::WsPushConnector;
use crate::services::token_store::TokenStore;
use async_channel::{Receiver, Sender};
use parking_lot::Mutex;
use refresh::RefreshTimer;
use shared::{Investment, MarketplaceItem, RegisterRequest, User};
use std::sync::Arc;
use trade::{PreviewScheduler, TradeWizard};

/// Client-side application: one per signed-in device.
pub struct Portal {
    pub config: PortalConfig,
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub notifications: Arc<NotificationStore>,
    pub holdings: Arc<HoldingsStore>,
    hub: NotificationHub,
    auto_refresh: Mutex<Option<RefreshTimer>>,

    /// Events from the client, stores and push channel.
    pub event_rx: Receiver<AppEvent>,
    event_tx: Sender<AppEvent>,
}

impl Portal {
    pub fn new(config: PortalConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let (event_tx, event_rx) = event_channel();

        let client = Arc::new(ApiClient::new(&config, tokens.clone())?.with_events(event_tx.clone()));
        let session = Arc::new(SessionStore::new(client.clone(), tokens.clone()).with_events(event_tx.clone()));
        let notifications = Arc::new(
            NotificationStore::new(client.clone(), config.notification_limit).with_events(event_tx.clone()),
        );
        let holdings = Arc::new(HoldingsStore::new(client.clone()).with_events(event_tx.clone()));
        let connector = WsPushConnector::new(config.ws_url.clone(), tokens, Some(event_tx.clone()));
        let hub = NotificationHub::new(notifications.clone(), Box::new(connector));

        Ok(Self {
            config,
            client,
            session,
            notifications,
            holdings,
            hub,
            auto_refresh: Mutex::new(None),
            event_rx,
            event_tx,
        })
    }

    /// Sender for front-end code that wants to publish on the same bus.
    pub fn events(&self) -> Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Restore a stored session and, if one exists, start the per-user services.
    pub async fn start(&self) -> Result<Option<User>> {
        let user = self.session.init().await?;
        if let Some(user) = &user {
            self.on_signed_in(user).await;
        }
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.session.login(email, password).await?;
        self.on_signed_in(&user).await;
        Ok(user)
    }

    /// Create an account; the new user is signed in like after `login`.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let user = self.session.register(request).await?;
        self.on_signed_in(&user).await;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.on_signed_out();
        self.session.logout().await
    }

    /// React to bus events that affect the whole application.
    pub fn handle_event(&self, event: &AppEvent) {
        match event {
            AppEvent::SessionExpired { .. } => {
                tracing::info!("Session expired, stopping per-user services");
                self.session.expire();
                self.on_signed_out();
            }
            AppEvent::SessionChanged { user_id: None } => self.on_signed_out(),
            _ => {}
        }
    }

    /// Tell the client which route is showing (an expiry on the login route does not redirect).
    pub fn set_route(&self, route: &str) {
        self.client.set_current_route(route);
    }

    pub fn buy_wizard(&self, item: MarketplaceItem, portfolio_id: Option<String>) -> TradeWizard {
        TradeWizard::buy(self.client.clone(), item, portfolio_id)
    }

    pub fn sell_wizard(&self, holding: Investment) -> TradeWizard {
        TradeWizard::sell(self.client.clone(), holding)
    }

    /// Debounced preview scheduler using the configured quiet period.
    pub fn preview_scheduler(&self) -> PreviewScheduler {
        PreviewScheduler::new(self.config.preview_debounce)
    }

    async fn on_signed_in(&self, user: &User) {
        self.hub.on_session(Some(&user.id)).await;
        if let Err(e) = self.holdings.load().await {
            tracing::warn!(error = %e, "Initial holdings load failed");
        }
        let timer = self.holdings.start_auto_refresh(self.config.refresh_interval);
        *self.auto_refresh.lock() = Some(timer);
    }

    fn on_signed_out(&self) {
        self.auto_refresh.lock().take();
        self.holdings.clear();
        self.hub.disconnect();
        self.notifications.clear();
    }
}
