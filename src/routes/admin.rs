use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Nested under `/api/admin`, one of the privileged prefixes in the route guard's
/// table, so every handler here may assume a privileged caller.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/stats
        // Blog, news and account counts for the dashboard.
        .route("/stats", get(handlers::get_admin_stats))
        // POST /api/admin/blogs, PUT|DELETE /api/admin/blogs/{id}
        .route("/blogs", post(handlers::create_blog))
        .route(
            "/blogs/{id}",
            put(handlers::update_blog).delete(handlers::delete_blog),
        )
        // POST /api/admin/news, PUT|DELETE /api/admin/news/{id}
        .route("/news", post(handlers::create_news))
        .route(
            "/news/{id}",
            put(handlers::update_news).delete(handlers::delete_news),
        )
        // GET /api/admin/contacts
        // Contact-form inbox.
        .route("/contacts", get(handlers::list_contacts))
}
