//! # Session Store
//!
//! Holds the authenticated user and drives the login/logout lifecycle.
//!
//! ```text
//!  Unauthenticated ──login/register──▶ Authenticated(User)
//!        ▲   │                               │
//!        │   └─init (token stored)─▶ Loading ┘ (profile fetched)
//!        └──────────── logout / expiry ◀─────┘
//! ```
//!
//! Every change of the signed-in user publishes [`AppEvent::SessionChanged`];
//! entering `Loading` does not.
//!
//! Credentials are validated locally first; a rejected form never reaches the
//! backend and comes back as [`PortalError::Validation`].

use crate::app::events::{publish, AppEvent};
use crate::core::error::{PortalError, Result};
use crate::core::service::AuthService;
use crate::services::token_store::TokenStore;
use crate::utils::validation::{validate_email, validate_new_password, validate_required, FieldErrors};
use async_channel::Sender;
use parking_lot::RwLock;
use shared::{AuthResponse, ChangePasswordRequest, RegisterRequest, UpdateProfileRequest, User};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Loading,
    Authenticated(User),
}

/// How [`SessionStore::update_user`] changes the current user.
#[derive(Debug, Clone)]
pub enum UserUpdate {
    /// A complete user object (e.g. returned by another endpoint); stored as-is.
    Replace(User),
    /// Changed fields only; sent to the backend and the response is stored.
    Patch(UpdateProfileRequest),
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    auth: Arc<dyn AuthService>,
    tokens: Arc<dyn TokenStore>,
    events: Option<Sender<AppEvent>>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthService>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::Unauthenticated),
            auth,
            tokens,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), SessionState::Loading)
    }

    /// Restore the session from stored tokens.
    ///
    /// Auth failures clear the tokens; other failures (backend down) keep them
    /// so the next start can try again.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<Option<User>> {
        if self.tokens.access_token().is_none() {
            tracing::debug!("No stored session");
            self.set_state(SessionState::Unauthenticated);
            return Ok(None);
        }

        self.set_state(SessionState::Loading);
        match self.auth.profile().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(Some(user))
            }
            Err(e) if e.is_auth_failure() => {
                tracing::info!(error = %e, "Stored session rejected");
                self.tokens.clear()?;
                self.set_state(SessionState::Unauthenticated);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not restore session");
                self.set_state(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_email(email));
        errors.check("password", validate_required(password, "Password"));
        errors.into_result()?;

        let response = self
            .auth
            .login(email.trim().to_string(), password.to_string())
            .await?;
        self.accept(response)
    }

    pub async fn register(&self, mut request: RegisterRequest) -> Result<User> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_email(&request.email));
        errors.check("password", validate_new_password(&request.password, "Password"));
        errors.check("firstName", validate_required(&request.first_name, "First name"));
        errors.check("lastName", validate_required(&request.last_name, "Last name"));
        errors.into_result()?;

        request.email = request.email.trim().to_string();
        request.first_name = request.first_name.trim().to_string();
        request.last_name = request.last_name.trim().to_string();
        let response = self.auth.register(request).await?;
        self.accept(response)
    }

    /// End the session. The backend call is best-effort; local state is always cleared.
    ///
    /// A token storage failure is returned after the user has been signed out.
    pub async fn logout(&self) -> Result<()> {
        let refresh_token = self.tokens.refresh_token();
        if let Err(e) = self.auth.logout(refresh_token).await {
            tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        let cleared = self.tokens.clear();
        self.set_state(SessionState::Unauthenticated);
        if let Err(e) = cleared {
            tracing::error!(error = %e, "Logged out but stored tokens could not be removed");
            return Err(e);
        }
        tracing::info!("Logged out");
        Ok(())
    }

    /// Called when the API client reports the refresh token was rejected.
    pub fn expire(&self) {
        if self.is_authenticated() || self.is_loading() {
            self.set_state(SessionState::Unauthenticated);
        }
    }

    pub async fn update_user(&self, update: UserUpdate) -> Result<User> {
        if !self.is_authenticated() {
            return Err(PortalError::State("Not logged in".to_string()));
        }
        let user = match update {
            UserUpdate::Replace(user) => user,
            UserUpdate::Patch(patch) => self.auth.update_profile(patch).await?,
        };
        self.set_state(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    pub async fn upload_profile_picture(&self, path: PathBuf) -> Result<User> {
        let user = self.auth.upload_profile_picture(path).await?;
        self.update_user(UserUpdate::Replace(user)).await
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check("currentPassword", validate_required(current_password, "Current password"));
        errors.check("newPassword", validate_new_password(new_password, "New password"));
        if !current_password.is_empty() && current_password == new_password {
            errors.insert("newPassword", "New password must be different from the current one");
        }
        errors.into_result()?;

        self.auth
            .change_password(ChangePasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
            })
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_email(email));
        errors.into_result()?;

        self.auth.forgot_password(email.trim().to_string()).await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check("token", validate_required(token, "Reset token"));
        errors.check("newPassword", validate_new_password(new_password, "New password"));
        errors.into_result()?;

        self.auth
            .reset_password(token.to_string(), new_password.to_string())
            .await
    }

    pub async fn verify_email(&self, token: &str) -> Result<()> {
        self.auth.verify_email(token.to_string()).await?;
        if let Some(mut user) = self.current_user() {
            user.email_verified = true;
            self.set_state(SessionState::Authenticated(user));
        }
        Ok(())
    }

    pub async fn resend_verification(&self) -> Result<()> {
        self.auth.resend_verification().await
    }

    fn accept(&self, response: AuthResponse) -> Result<User> {
        self.tokens
            .set_tokens(&response.access_token, Some(&response.refresh_token))?;
        let user = response.user;
        tracing::info!(user_id = %user.id, role = ?user.role, "Session started");
        self.set_state(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    fn set_state(&self, next: SessionState) {
        let changed_user = {
            let mut state = self.state.write();
            let before = user_id(&state);
            *state = next;
            let after = user_id(&state);
            (before != after).then_some(after)
        };
        if let Some(user_id) = changed_user {
            publish(self.events.as_ref(), AppEvent::SessionChanged { user_id });
        }
    }
}

fn user_id(state: &SessionState) -> Option<String> {
    match state {
        SessionState::Authenticated(user) => Some(user.id.clone()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::token_store::MemoryTokenStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::{KycStatus, Role};

    pub(crate) fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            date_of_birth: None,
            profile_picture: None,
            kyc_status: KycStatus::Verified,
            email_verified: false,
            role: Role::Client,
            created_at: None,
            updated_at: None,
        }
    }

    /// Accepts "secret" as the only password; `profile` answers with `profile_result`.
    pub(crate) struct MockAuth {
        pub profile_result: Mutex<Result<User>>,
        pub logout_fails: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockAuth {
        pub(crate) fn new() -> Self {
            Self {
                profile_result: Mutex::new(Ok(user("u1"))),
                logout_fails: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: &str) {
            self.calls.lock().push(call.to_string());
        }
    }

    #[async_trait]
    impl AuthService for MockAuth {
        async fn login(&self, email: String, password: String) -> Result<AuthResponse> {
            self.record("login");
            if password != "secret" {
                return Err(PortalError::api(401, "Invalid email or password"));
            }
            let mut user = user("u1");
            user.email = email;
            Ok(AuthResponse {
                user,
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
            })
        }

        async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
            self.record("register");
            let mut user = user("u2");
            user.email = request.email;
            user.first_name = request.first_name;
            user.last_name = request.last_name;
            Ok(AuthResponse {
                user,
                access_token: "access-2".to_string(),
                refresh_token: "refresh-2".to_string(),
            })
        }

        async fn logout(&self, _refresh_token: Option<String>) -> Result<()> {
            self.record("logout");
            if self.logout_fails {
                return Err(PortalError::Network("connection refused".to_string()));
            }
            Ok(())
        }

        async fn profile(&self) -> Result<User> {
            self.record("profile");
            self.profile_result.lock().clone()
        }

        async fn update_profile(&self, update: UpdateProfileRequest) -> Result<User> {
            self.record("update_profile");
            let mut user = user("u1");
            if let Some(phone) = update.phone {
                user.phone = Some(phone);
            }
            Ok(user)
        }

        async fn upload_profile_picture(&self, path: PathBuf) -> Result<User> {
            self.record("upload_profile_picture");
            let mut user = user("u1");
            user.profile_picture = path.file_name().map(|n| n.to_string_lossy().to_string());
            Ok(user)
        }

        async fn change_password(&self, _request: ChangePasswordRequest) -> Result<()> {
            self.record("change_password");
            Ok(())
        }

        async fn forgot_password(&self, _email: String) -> Result<()> {
            self.record("forgot_password");
            Ok(())
        }

        async fn reset_password(&self, _token: String, _new_password: String) -> Result<()> {
            self.record("reset_password");
            Ok(())
        }

        async fn verify_email(&self, _token: String) -> Result<()> {
            self.record("verify_email");
            Ok(())
        }

        async fn resend_verification(&self) -> Result<()> {
            self.record("resend_verification");
            Ok(())
        }
    }

    fn store_with(auth: MockAuth, tokens: MemoryTokenStore) -> (SessionStore, Arc<MockAuth>, Arc<MemoryTokenStore>) {
        let auth = Arc::new(auth);
        let tokens = Arc::new(tokens);
        let store = SessionStore::new(auth.clone(), tokens.clone());
        (store, auth, tokens)
    }

    #[tokio::test]
    async fn test_init_without_token_skips_profile_fetch() {
        let (store, auth, _) = store_with(MockAuth::new(), MemoryTokenStore::new());

        assert!(store.init().await.unwrap().is_none());
        assert_eq!(store.state(), SessionState::Unauthenticated);
        assert!(auth.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_init_restores_user_from_token() {
        let (store, _, _) = store_with(MockAuth::new(), MemoryTokenStore::with_tokens("a", "r"));

        let user = store.init().await.unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_init_clears_tokens_on_auth_failure() {
        let auth = MockAuth::new();
        *auth.profile_result.lock() = Err(PortalError::SessionExpired);
        let (store, _, tokens) = store_with(auth, MemoryTokenStore::with_tokens("a", "r"));

        assert!(store.init().await.unwrap().is_none());
        assert!(tokens.access_token().is_none());
        assert_eq!(store.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_init_keeps_tokens_when_backend_unreachable() {
        let auth = MockAuth::new();
        *auth.profile_result.lock() = Err(PortalError::Network("refused".to_string()));
        let (store, _, tokens) = store_with(auth, MemoryTokenStore::with_tokens("a", "r"));

        assert!(store.init().await.is_err());
        assert_eq!(tokens.access_token().as_deref(), Some("a"));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_user_without_refetch() {
        let (tx, rx) = crate::app::events::event_channel();
        let (store, auth, tokens) = store_with(MockAuth::new(), MemoryTokenStore::new());
        let store = store.with_events(tx);

        let user = store.login(" jane@example.com ", "secret").await.unwrap();

        assert_eq!(user.email, "jane@example.com");
        assert_eq!(tokens.access_token().as_deref(), Some("access-1"));
        assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(*auth.calls.lock(), vec!["login".to_string()]);
        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::SessionChanged {
                user_id: Some("u1".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_backend_message() {
        let (store, _, tokens) = store_with(MockAuth::new(), MemoryTokenStore::new());

        let err = store.login("jane@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.user_message("Login failed"), "Invalid email or password");
        assert!(tokens.access_token().is_none());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let mut auth = MockAuth::new();
        auth.logout_fails = true;
        let (store, _, tokens) = store_with(auth, MemoryTokenStore::new());
        store.login("jane@example.com", "secret").await.unwrap();

        store.logout().await.unwrap();

        assert!(tokens.access_token().is_none());
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_update_user_replace_and_patch() {
        let (store, auth, _) = store_with(MockAuth::new(), MemoryTokenStore::new());
        store.login("jane@example.com", "secret").await.unwrap();

        let mut replacement = user("u1");
        replacement.city = Some("Lisbon".to_string());
        store.update_user(UserUpdate::Replace(replacement)).await.unwrap();
        assert_eq!(store.current_user().unwrap().city.as_deref(), Some("Lisbon"));
        assert!(!auth.calls.lock().contains(&"update_profile".to_string()));

        let patch = UpdateProfileRequest {
            phone: Some("+15551234567".to_string()),
            ..Default::default()
        };
        store.update_user(UserUpdate::Patch(patch)).await.unwrap();
        assert_eq!(
            store.current_user().unwrap().phone.as_deref(),
            Some("+15551234567")
        );
    }

    #[tokio::test]
    async fn test_update_user_requires_session() {
        let (store, _, _) = store_with(MockAuth::new(), MemoryTokenStore::new());
        let result = store.update_user(UserUpdate::Replace(user("u1"))).await;
        assert!(matches!(result, Err(PortalError::State(_))));
    }

    #[tokio::test]
    async fn test_expire_resets_state() {
        let (tx, rx) = crate::app::events::event_channel();
        let (store, _, _) = store_with(MockAuth::new(), MemoryTokenStore::new());
        let store = store.with_events(tx);
        store.login("jane@example.com", "secret").await.unwrap();
        let _ = rx.try_recv();

        store.expire();

        assert!(!store.is_authenticated());
        assert_eq!(rx.try_recv().unwrap(), AppEvent::SessionChanged { user_id: None });
    }

    /// Holds tokens in memory but cannot delete them.
    struct StuckTokenStore(MemoryTokenStore);

    impl TokenStore for StuckTokenStore {
        fn access_token(&self) -> Option<String> {
            self.0.access_token()
        }

        fn refresh_token(&self) -> Option<String> {
            self.0.refresh_token()
        }

        fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
            self.0.set_tokens(access_token, refresh_token)
        }

        fn clear(&self) -> Result<()> {
            Err(PortalError::Storage("token file is read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_logout_signs_out_even_when_tokens_cannot_be_removed() {
        let (tx, rx) = crate::app::events::event_channel();
        let store = SessionStore::new(Arc::new(MockAuth::new()), Arc::new(StuckTokenStore(MemoryTokenStore::new())))
            .with_events(tx);
        store.login("jane@example.com", "secret").await.unwrap();
        let _ = rx.try_recv();

        let result = store.logout().await;

        assert!(matches!(result, Err(PortalError::Storage(_))));
        assert!(!store.is_authenticated());
        assert!(store.current_user().is_none());
        assert_eq!(rx.try_recv().unwrap(), AppEvent::SessionChanged { user_id: None });
    }

    #[tokio::test]
    async fn test_invalid_credentials_never_reach_backend() {
        let (store, auth, _) = store_with(MockAuth::new(), MemoryTokenStore::new());

        let err = store.login("not-an-email", "secret").await.unwrap_err();
        assert_eq!(err.user_message("Login failed"), "Invalid email format");
        assert!(matches!(store.login("jane@example.com", "").await, Err(PortalError::Validation(_))));

        let weak = RegisterRequest {
            email: "jane@example.com".to_string(),
            password: "password".to_string(),
            first_name: "Jane".to_string(),
            last_name: " ".to_string(),
            phone: None,
        };
        match store.register(weak).await {
            Err(PortalError::Validation(errors)) => {
                assert_eq!(
                    errors.get("password"),
                    Some("Password must contain at least one uppercase letter")
                );
                assert_eq!(errors.get("lastName"), Some("Last name is required"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert!(store.change_password("OldPass123", "OldPass123").await.is_err());
        assert!(store.reset_password("", "NewPass123").await.is_err());
        assert!(store.forgot_password("jane@").await.is_err());

        assert!(auth.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_valid_register_and_password_flows_pass_through() {
        let (store, auth, tokens) = store_with(MockAuth::new(), MemoryTokenStore::new());

        let user = store
            .register(RegisterRequest {
                email: " new@example.com ".to_string(),
                password: "Str0ngPass".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(tokens.access_token().as_deref(), Some("access-2"));

        store.change_password("OldPass123", "NewPass456").await.unwrap();
        store.reset_password("reset-token", "NewPass456").await.unwrap();
        store.forgot_password("new@example.com").await.unwrap();
        assert_eq!(
            *auth.calls.lock(),
            vec!["register", "change_password", "reset_password", "forgot_password"]
        );
    }

    #[tokio::test]
    async fn test_init_publishes_only_the_established_user() {
        let (tx, rx) = crate::app::events::event_channel();
        let (store, _, _) = store_with(MockAuth::new(), MemoryTokenStore::with_tokens("a", "r"));
        let store = store.with_events(tx);

        store.init().await.unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            AppEvent::SessionChanged {
                user_id: Some("u1".to_string())
            }
        );
        assert!(rx.try_recv().is_err());
    }
}
