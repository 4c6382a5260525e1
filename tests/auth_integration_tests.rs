use axum::{
    extract::FromRequestParts,
    http::{Method, Request, request::Parts},
};
use newsroom_portal::{
    AppError,
    auth::{self, AuthSession, Claims, LoginError, TokenKeys},
    models::{Account, Role},
    password::hash_password,
    repository::{MemoryRepository, Repository},
};
use std::time::Instant;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_SECRET: &str = "test-secret-value-1234567890";

fn keys() -> TokenKeys {
    TokenKeys::new(TEST_SECRET, 3600)
}

/// A store holding `a@x.com` / "correct-password" with the given role.
async fn seeded_repo(role: Option<Role>) -> (MemoryRepository, Account) {
    let repo = MemoryRepository::new();
    let hash = hash_password("correct-password").await.unwrap();
    let account = repo
        .create_account(Account::new("Ada".to_string(), "a@x.com", hash, role))
        .await
        .unwrap();
    (repo, account)
}

fn get_request_parts() -> Parts {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/me")
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Issuer ---

#[tokio::test]
async fn test_login_privileged_account_yields_privileged_token() {
    let (repo, account) = seeded_repo(Some(Role::Privileged)).await;

    let issued = auth::login(&repo, &keys(), "a@x.com", "correct-password")
        .await
        .expect("valid credentials");

    assert_eq!(issued.claims.sub, account.id);
    assert_eq!(issued.claims.role, Role::Privileged);

    let decoded = keys().decode(&issued.token).unwrap();
    assert_eq!(decoded, issued.claims);
}

#[tokio::test]
async fn test_login_account_without_role_yields_standard_token() {
    let (repo, _) = seeded_repo(None).await;
    let issued = auth::login(&repo, &keys(), "a@x.com", "correct-password")
        .await
        .unwrap();
    assert_eq!(issued.claims.role, Role::Standard);
}

#[tokio::test]
async fn test_login_email_is_normalized() {
    let (repo, _) = seeded_repo(None).await;
    assert!(
        auth::login(&repo, &keys(), "  A@X.COM ", "correct-password")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_login_wrong_password_is_secret_mismatch() {
    let (repo, _) = seeded_repo(Some(Role::Privileged)).await;
    let result = auth::login(&repo, &keys(), "a@x.com", "wrong-password").await;
    assert!(matches!(result, Err(LoginError::SecretMismatch)));
}

#[tokio::test]
async fn test_login_unknown_email_is_unknown_identity() {
    let (repo, _) = seeded_repo(Some(Role::Privileged)).await;
    let result = auth::login(&repo, &keys(), "unknown@x.com", "anything").await;
    assert!(matches!(result, Err(LoginError::UnknownIdentity)));
}

#[tokio::test]
async fn test_unknown_email_costs_a_password_check() {
    let (repo, _) = seeded_repo(None).await;
    // Warm up so one-time setup is not measured.
    let _ = auth::login(&repo, &keys(), "ghost@x.com", "anything").await;

    let started = Instant::now();
    let _ = auth::login(&repo, &keys(), "a@x.com", "wrong-password").await;
    let known = started.elapsed();

    let started = Instant::now();
    let result = auth::login(&repo, &keys(), "ghost@x.com", "wrong-password").await;
    let unknown = started.elapsed();

    assert!(matches!(result, Err(LoginError::UnknownIdentity)));
    // Without a hash check the unknown path returns in microseconds.
    assert!(
        unknown * 4 >= known,
        "unknown email answered in {unknown:?}, known email in {known:?}"
    );
}

#[tokio::test]
async fn test_login_does_not_write_to_store() {
    let (repo, _) = seeded_repo(None).await;
    let before = repo.stats().await.unwrap();
    let _ = auth::login(&repo, &keys(), "a@x.com", "correct-password").await;
    let _ = auth::login(&repo, &keys(), "a@x.com", "nope").await;
    assert_eq!(repo.stats().await.unwrap(), before);
}

#[tokio::test]
async fn test_role_claim_is_not_refreshed_after_promotion() {
    // Tokens carry the role they were minted with. A later change in the store is
    // not visible until the caller signs in again.
    let (repo, _) = seeded_repo(None).await;
    let issued = auth::login(&repo, &keys(), "a@x.com", "correct-password")
        .await
        .unwrap();

    let promoted_repo = MemoryRepository::new();
    let mut promoted = repo.find_account_by_email("a@x.com").await.unwrap().unwrap();
    promoted.role = Role::Privileged;
    promoted_repo.create_account(promoted).await.unwrap();

    assert_eq!(keys().decode(&issued.token).unwrap().role, Role::Standard);
    let fresh = auth::login(&promoted_repo, &keys(), "a@x.com", "correct-password")
        .await
        .unwrap();
    assert_eq!(fresh.claims.role, Role::Privileged);
}

// --- Session extractor ---

#[tokio::test]
async fn test_session_extractor_reads_guard_claims() {
    let mut parts = get_request_parts();
    let id = Uuid::new_v4();
    parts.extensions.insert(Claims {
        sub: id,
        email: "a@x.com".to_string(),
        role: Role::Standard,
        iat: 0,
        exp: 4_102_444_800,
    });

    let session = AuthSession::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.role, Role::Standard);
    assert_eq!(session.expires_at.timestamp(), 4_102_444_800);
}

#[tokio::test]
async fn test_session_extractor_without_claims_is_unauthenticated() {
    let mut parts = get_request_parts();
    let result = AuthSession::from_request_parts(&mut parts, &()).await;
    assert!(matches!(result, Err(AppError::Unauthenticated)));
}
