use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use newsroom_portal::{
    AppConfig, AppState, create_router,
    models::{Account, MessageResponse, Role},
    repository::MemoryRepository,
};
use std::sync::Arc;
use tower::ServiceExt;

// --- Helpers ---

fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryRepository::new()), AppConfig::default())
}

fn token_for(state: &AppState, role: Role) -> String {
    let account = Account::new("T".into(), "t@x.com", "unused".into(), Some(role));
    state.keys.issue(&account).unwrap().token
}

async fn send(app: Router, method: Method, uri: &str, bearer: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

async fn message(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice::<MessageResponse>(&bytes).unwrap().message
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// --- Unprotected paths ---

#[tokio::test]
async fn test_public_paths_ignore_token_presence_and_role() {
    let state = test_state();
    let standard = token_for(&state, Role::Standard);
    let admin = token_for(&state, Role::Privileged);

    for token in [None, Some(standard.as_str()), Some(admin.as_str()), Some("garbage")] {
        let app = create_router(state.clone());
        let response = send(app, Method::GET, "/api/blogs", token).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// --- API-shaped protected paths ---

#[tokio::test]
async fn test_admin_api_without_token_is_401_json() {
    let app = create_router(test_state());
    let response = send(app, Method::GET, "/api/admin/stats", None).await;

    // A missing token gets its own wording; "Forbidden: Admin access required" is
    // reserved for the 403 below, so clients can tell the two apart by body alone.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(response).await, "Not Authenticated: Please log in.");
}

#[tokio::test]
async fn test_admin_api_with_standard_role_is_403_json() {
    let state = test_state();
    let token = token_for(&state, Role::Standard);
    let app = create_router(state);

    let response = send(app, Method::GET, "/api/admin/stats", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(response).await, "Forbidden: Admin access required");
}

#[tokio::test]
async fn test_admin_api_with_privileged_role_reaches_handler() {
    let state = test_state();
    let token = token_for(&state, Role::Privileged);
    let app = create_router(state);

    let response = send(app, Method::GET, "/api/admin/stats", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guard_covers_every_method_under_prefix() {
    let state = test_state();
    let token = token_for(&state, Role::Standard);
    let id = uuid::Uuid::new_v4();

    for (method, uri) in [
        (Method::POST, "/api/admin/blogs".to_string()),
        (Method::PUT, format!("/api/admin/news/{id}")),
        (Method::DELETE, format!("/api/admin/blogs/{id}")),
        (Method::GET, "/api/admin/contacts".to_string()),
        // No such route: still guarded, not a 404.
        (Method::GET, "/api/admin/does-not-exist".to_string()),
    ] {
        let app = create_router(state.clone());
        let response = send(app, method.clone(), &uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_forged_token_counts_as_no_token() {
    let state = test_state();
    let account = Account::new("T".into(), "t@x.com", "unused".into(), Some(Role::Privileged));
    let forged = newsroom_portal::TokenKeys::new("attacker-secret", 3600)
        .issue(&account)
        .unwrap()
        .token;

    let app = create_router(state);
    let response = send(app, Method::GET, "/api/admin/stats", Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_token_is_accepted() {
    let state = test_state();
    let token = token_for(&state, Role::Privileged);
    let app = create_router(state);

    let request = Request::builder()
        .uri("/api/admin/stats")
        .header(header::COOKIE, format!("session_token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// --- Page-shaped protected paths ---

#[tokio::test]
async fn test_admin_page_without_token_redirects_to_sign_in() {
    let app = create_router(test_state());
    let response = send(app, Method::GET, "/admin/stats", None).await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/sign-in?callbackUrl=%2Fadmin%2Fstats");
}

#[tokio::test]
async fn test_admin_page_with_standard_role_redirects_to_unauthorized() {
    let state = test_state();
    let token = token_for(&state, Role::Standard);
    let app = create_router(state);

    let response = send(app, Method::GET, "/admin/dashboard", Some(&token)).await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/unauthorized");
}

#[tokio::test]
async fn test_admin_page_with_privileged_role_passes_guard() {
    let state = test_state();
    let token = token_for(&state, Role::Privileged);
    let app = create_router(state);

    // Page rendering is the frontend's job; passing the guard means no redirect.
    let response = send(app, Method::GET, "/admin/dashboard", Some(&token)).await;
    assert!(!response.status().is_redirection());
}

// --- Configured rule table ---

#[tokio::test]
async fn test_custom_prefix_table_is_honored() {
    let config = AppConfig {
        privileged_paths: vec!["/api/contact".to_string()],
        ..AppConfig::default()
    };
    let state = AppState::new(Arc::new(MemoryRepository::new()), config);

    // Now the contact form is privileged and the admin API is not.
    let response = send(create_router(state.clone()), Method::POST, "/api/contact", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(create_router(state), Method::GET, "/api/admin/stats", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// --- Authenticated (any role) routes ---

#[tokio::test]
async fn test_me_requires_a_session() {
    let state = test_state();
    let response = send(create_router(state.clone()), Method::GET, "/api/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = token_for(&state, Role::Standard);
    let response = send(create_router(state), Method::GET, "/api/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
