use super::*;
use crate::app::{Portal, SessionState};
use axum::routing::{get, post};
use axum::Router;
use shared::RegisterRequest;
use std::sync::atomic::{AtomicBool, Ordering};

fn notification(id: &str, is_read: bool) -> Value {
    json!({
        "id": id,
        "type": "DEPOSIT_COMPLETED",
        "title": "Deposit completed",
        "message": "Your deposit has been credited",
        "isRead": is_read,
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

fn backend(logged_out: Arc<AtomicBool>) -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(|| async {
                ok(json!({
                    "user": user_json("u1"),
                    "accessToken": "access-1",
                    "refreshToken": "refresh-1"
                }))
            }),
        )
        .route(
            "/api/auth/register",
            post(|| async {
                ok(json!({
                    "user": user_json("u2"),
                    "accessToken": "access-2",
                    "refreshToken": "refresh-2"
                }))
            }),
        )
        .route(
            "/api/auth/logout",
            post(move || {
                let logged_out = logged_out.clone();
                async move {
                    logged_out.store(true, Ordering::SeqCst);
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route(
            "/api/notifications",
            get(|| async { ok(json!([notification("n1", false), notification("n2", true)])) }),
        )
        .route("/api/notifications/unread-count", get(|| async { ok(json!({ "count": 1 })) }))
        .route("/api/investments", get(|| async { ok(json!([])) }))
        .route(
            "/api/portfolios",
            get(|| async { ok(json!([{ "id": "p1", "name": "Main", "totalValue": 2500.5 }])) }),
        )
}

#[tokio::test]
async fn test_login_loads_user_services_and_logout_clears_them() {
    let logged_out = Arc::new(AtomicBool::new(false));
    let base = serve(backend(logged_out.clone())).await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let portal = Portal::new(config(&base), tokens.clone()).unwrap();

    assert_eq!(portal.start().await.unwrap(), None);

    let user = portal.login("jane@example.com", "secret").await.unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(tokens.access_token().as_deref(), Some("access-1"));
    assert_eq!(portal.notifications.unread_count(), 1);
    assert_eq!(portal.holdings.snapshot().portfolios[0].name, "Main");

    portal.logout().await.unwrap();
    assert!(logged_out.load(Ordering::SeqCst));
    assert_eq!(portal.session.state(), SessionState::Unauthenticated);
    assert!(tokens.access_token().is_none());
    assert!(portal.notifications.items().is_empty());
    assert!(portal.holdings.snapshot().portfolios.is_empty());
}

#[tokio::test]
async fn test_session_expiry_event_stops_user_services() {
    let base = serve(backend(Arc::new(AtomicBool::new(false)))).await;
    let portal = Portal::new(config(&base), Arc::new(MemoryTokenStore::new())).unwrap();
    portal.login("jane@example.com", "secret").await.unwrap();

    portal.handle_event(&AppEvent::SessionExpired {
        redirect_to_login: true,
    });

    assert!(!portal.session.is_authenticated());
    assert_eq!(portal.notifications.unread_count(), 0);
    assert!(portal.holdings.snapshot().portfolios.is_empty());
}

#[tokio::test]
async fn test_register_signs_in_and_loads_user_services() {
    let base = serve(backend(Arc::new(AtomicBool::new(false)))).await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let portal = Portal::new(config(&base), tokens.clone()).unwrap();

    let user = portal
        .register(RegisterRequest {
            email: "new@example.com".to_string(),
            password: "Str0ngPass".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(user.id, "u2");
    assert!(portal.session.is_authenticated());
    assert_eq!(tokens.access_token().as_deref(), Some("access-2"));
    assert_eq!(portal.notifications.unread_count(), 1);
    assert_eq!(portal.holdings.snapshot().portfolios[0].name, "Main");
}
