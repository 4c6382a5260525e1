use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;

// Routing segregated by access level (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{AuthSession, TokenKeys};
pub use config::AppConfig;
pub use error::AppError;
pub use guard::GuardRules;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from every `#[utoipa::path]` handler and schema,
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login_user, handlers::logout_user,
        handlers::get_me, handlers::get_profile,
        handlers::list_blogs, handlers::get_blog, handlers::create_blog,
        handlers::update_blog, handlers::delete_blog,
        handlers::list_news, handlers::get_news, handlers::create_news,
        handlers::update_news, handlers::delete_news,
        handlers::submit_contact, handlers::list_contacts, handlers::get_admin_stats
    ),
    components(
        schemas(
            models::Role, models::AccountProfile, models::Article, models::ContactMessage,
            models::RegisterRequest, models::LoginRequest, models::CreateContentRequest,
            models::UpdateContentRequest, models::ContactRequest, models::RegisterResponse,
            models::LoginResponse, models::SessionInfo, models::SiteStats,
            models::MessageResponse,
        )
    ),
    tags(
        (name = "newsroom-portal", description = "Blog, news and contact API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable application services. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer.
    pub repo: RepositoryState,
    /// Configuration loaded at startup.
    pub config: AppConfig,
    /// Session-token signing and verification.
    pub keys: Arc<TokenKeys>,
    /// Protected-path table, fixed for the life of the process.
    pub guard: Arc<GuardRules>,
}

impl AppState {
    /// Derives the token keys and guard table from `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let keys = Arc::new(TokenKeys::from_config(&config));
        let guard = Arc::new(GuardRules::privileged(config.privileged_paths.clone()));
        Self {
            repo,
            config,
            keys,
            guard,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_session
///
/// Route layer for the authenticated group: extracting `AuthSession` fails with 401
/// when the route guard attached no claims, so the handler never runs.
async fn require_session(_session: AuthSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, the route guard, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn(require_session)),
        )
        .nest("/api/admin", admin::admin_routes())
        // The guard wraps every route and the fallback, so it sees each request
        // (with its full path) before any handler.
        .layer(middleware::from_fn_with_state(state.clone(), guard::route_guard))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, uri and the request id, so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
