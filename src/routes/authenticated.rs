use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in user, whatever their role. The `AuthSession` layer applied
/// in `create_router` rejects requests without a valid token before these handlers run.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // What the caller's token says about them.
        .route("/api/me", get(handlers::get_me))
        // GET /api/me/profile
        // The stored account behind the token.
        .route("/api/me/profile", get(handlers::get_profile))
}
