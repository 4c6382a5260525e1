use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Reads of editorial content are public;
/// every write lives in the admin module.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/register
        // Creates a standard account.
        .route("/api/auth/register", post(handlers::register_user))
        // POST /api/auth/login
        // Issues a session token (body + cookie).
        .route("/api/auth/login", post(handlers::login_user))
        // POST /api/auth/logout
        .route("/api/auth/logout", post(handlers::logout_user))
        // GET /api/blogs, GET /api/blogs/{id}
        .route("/api/blogs", get(handlers::list_blogs))
        .route("/api/blogs/{id}", get(handlers::get_blog))
        // GET /api/news, GET /api/news/{id}
        .route("/api/news", get(handlers::list_news))
        .route("/api/news/{id}", get(handlers::get_news))
        // POST /api/contact
        .route("/api/contact", post(handlers::submit_contact))
        // Redirect targets used by the route guard for page requests.
        .route("/sign-in", get(handlers::sign_in_page))
        .route("/unauthorized", get(handlers::unauthorized_page))
}
