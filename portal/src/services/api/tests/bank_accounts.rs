use super::*;
use crate::app::forms::{BankAccountField, BankAccountForm};
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use shared::AccountType;

#[tokio::test]
async fn test_add_account_sends_exactly_the_form_fields() {
    let received: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = received.clone();
    let router = Router::new().route(
        "/api/bank-accounts",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                assert_eq!(bearer(&headers).as_deref(), Some("access-1"));
                let mut account = body.clone();
                account["id"] = json!("ba-1");
                *sink.lock() = Some(body);
                (StatusCode::CREATED, Json(json!({ "data": account, "message": "Bank account added" })))
            }
        }),
    );
    let base = serve(router).await;
    let (client, _events) = client(&base, Arc::new(MemoryTokenStore::with_tokens("access-1", "refresh-1")));

    let mut form = BankAccountForm::new();
    form.set(BankAccountField::AccountHolderName, "Jane Doe");
    form.set(BankAccountField::AccountNumber, "9876543210");
    form.set(BankAccountField::BankName, "New Bank");
    form.set(BankAccountField::BankCode, "NB");
    form.set_account_type(AccountType::Checking);
    form.set(BankAccountField::Currency, "USD");
    form.set(BankAccountField::Balance, "1000");

    let mut created_id = None;
    let account = form
        .submit(&client, |account| created_id = Some(account.id.clone()))
        .await
        .unwrap();

    assert_eq!(created_id.as_deref(), Some("ba-1"));
    assert_eq!(account.account_holder_name, "Jane Doe");

    let body = received.lock().take().unwrap();
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 7);
    assert_eq!(fields["accountHolderName"], "Jane Doe");
    assert_eq!(fields["accountNumber"], "9876543210");
    assert_eq!(fields["bankName"], "New Bank");
    assert_eq!(fields["bankCode"], "NB");
    assert_eq!(fields["accountType"], "CHECKING");
    assert_eq!(fields["currency"], "USD");
    assert_eq!(fields["balance"].as_f64(), Some(1000.0));
}

#[tokio::test]
async fn test_backend_rejection_is_shown_verbatim() {
    let router = Router::new().route(
        "/api/bank-accounts",
        post(|| async { error(StatusCode::CONFLICT, "An account with this number already exists") }),
    );
    let base = serve(router).await;
    let (client, _events) = client(&base, Arc::new(MemoryTokenStore::with_tokens("access-1", "refresh-1")));

    let mut form = BankAccountForm::new();
    form.set(BankAccountField::AccountHolderName, "Jane Doe");
    form.set(BankAccountField::AccountNumber, "9876543210");
    form.set(BankAccountField::BankName, "New Bank");
    form.set(BankAccountField::BankCode, "NB");
    form.set_account_type(AccountType::Savings);

    let mut called = false;
    assert!(form.submit(&client, |_| called = true).await.is_err());

    assert!(!called);
    assert_eq!(
        form.core().state.error(),
        Some("An account with this number already exists")
    );
}
