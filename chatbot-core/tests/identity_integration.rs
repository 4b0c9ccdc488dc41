//! Account creation and credential checks against a live PostgreSQL.

mod common;

use chatbot_core::{AccountError, AccountService, NewAccount, PasswordPolicy, PgAccountService};
use common::{make_pool, tenant, unique_email};
use uuid::Uuid;

fn account(client_id: Uuid, email: &str) -> NewAccount {
    NewAccount {
        client_id,
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Roe".to_string(),
        phone_number: None,
        email_confirmed: false,
    }
}

// ===========================================================================
// TEST 1: weak passwords are rejected with every policy failure at once
// ===========================================================================
#[tokio::test]
async fn test_weak_password_is_rejected() {
    let pool = match make_pool().await {
        Some(p) => p,
        None => {
            eprintln!("Skipping test_weak_password_is_rejected: DB unavailable");
            return;
        }
    };
    let client = tenant(&pool).await;
    let service = PgAccountService::new(pool.clone(), PasswordPolicy::default());

    let err = service
        .create_account(account(client.id, &unique_email("weak")), "abc")
        .await
        .unwrap_err();
    match err {
        AccountError::Validation(errors) => assert_eq!(errors.len(), 4, "got {:?}", errors),
        other => panic!("expected Validation, got {:?}", other),
    }
}

// ===========================================================================
// TEST 2: one account per email, compared case-insensitively
// ===========================================================================
#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let pool = match make_pool().await {
        Some(p) => p,
        None => {
            eprintln!("Skipping test_duplicate_email_is_rejected: DB unavailable");
            return;
        }
    };
    let client = tenant(&pool).await;
    let service = PgAccountService::new(pool.clone(), PasswordPolicy::default());
    let email = unique_email("dup");

    service
        .create_account(account(client.id, &email), "Secret#42")
        .await
        .unwrap();
    let err = service
        .create_account(account(client.id, &email.to_uppercase()), "Secret#42")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateEmail(_)), "got {:?}", err);
}

// ===========================================================================
// TEST 3: credential checks stamp last_login_at and ignore bad passwords
// ===========================================================================
#[tokio::test]
async fn test_verify_credentials() {
    let pool = match make_pool().await {
        Some(p) => p,
        None => {
            eprintln!("Skipping test_verify_credentials: DB unavailable");
            return;
        }
    };
    let client = tenant(&pool).await;
    let service = PgAccountService::new(pool.clone(), PasswordPolicy::default());
    let email = unique_email("login");

    let created = service
        .create_account(account(client.id, &email), "Secret#42")
        .await
        .unwrap();
    assert!(created.last_login_at.is_none());
    assert_ne!(created.password_hash, "Secret#42");

    assert!(service.verify_credentials(&email, "wrong").await.unwrap().is_none());
    let unknown = unique_email("nobody");
    assert!(service.verify_credentials(&unknown, "Secret#42").await.unwrap().is_none());

    let user = service
        .verify_credentials(&email, "Secret#42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, created.id);
    assert!(user.last_login_at.is_some());
}

// ===========================================================================
// TEST 4: inactive users cannot sign in
// ===========================================================================
#[tokio::test]
async fn test_inactive_user_cannot_sign_in() {
    let pool = match make_pool().await {
        Some(p) => p,
        None => {
            eprintln!("Skipping test_inactive_user_cannot_sign_in: DB unavailable");
            return;
        }
    };
    let client = tenant(&pool).await;
    let service = PgAccountService::new(pool.clone(), PasswordPolicy::default());
    let email = unique_email("inactive");

    let user = service
        .create_account(account(client.id, &email), "Secret#42")
        .await
        .unwrap();
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(service.verify_credentials(&email, "Secret#42").await.unwrap().is_none());
}
