use crate::{
    AppState,
    auth::{self, AuthSession},
    error::AppError,
    models::{
        Account, AccountProfile, Article, ContactMessage, ContactRequest, ContentKind,
        CreateContentRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        RegisterResponse, SessionInfo, SiteStats, UpdateContentRequest,
    },
    password::hash_password,
    repository::MSG_EMAIL_TAKEN,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use uuid::Uuid;

// Every handler registered under `/api/admin` runs only after the route guard has
// admitted a privileged token. They do not repeat that check.

// --- Auth ---

/// register_user
///
/// [Public Route] Creates a `Standard` account. Any role in the payload is ignored.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Missing fields", body = MessageResponse),
        (status = 409, description = "Email taken", body = MessageResponse)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if !payload.is_complete() {
        return Err(AppError::Validation("Please fill in all fields".to_string()));
    }

    if state.repo.find_account_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(MSG_EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&payload.password)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let account = Account::new(payload.name.trim().to_string(), &payload.email, password_hash, None);
    // The store enforces uniqueness too; a concurrent registration surfaces as 409 here.
    let created = state.repo.create_account(account).await?;

    tracing::info!(account_id = %created.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: created.id,
        }),
    ))
}

/// login_user
///
/// [Public Route] Exchanges credentials for a session token. The token is returned in
/// the body and also set as an HttpOnly cookie. Unknown email and wrong password produce
/// the same 401 response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = auth::login(state.repo.as_ref(), &state.keys, &payload.email, &payload.password)
        .await
        .inspect_err(|e| tracing::debug!(reason = %e, "login failed"))?;

    // Profile is read after the credential check so the response reflects the stored account.
    let account = state
        .repo
        .find_account(issued.claims.sub)
        .await?
        .ok_or_else(|| AppError::Internal("account vanished during login".to_string()))?;

    let cookie = auth::session_cookie(&issued.token, state.keys.ttl(), &state.config.env)
        .ok_or_else(|| AppError::Internal("token is not a valid header value".to_string()))?;

    let body = LoginResponse {
        expires_at: issued.claims.expires_at(),
        token: issued.token,
        user: account.profile(),
    };
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)))
}

/// logout_user
///
/// [Public Route] Clears the session cookie. Tokens already handed out stay valid until
/// they expire.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Cookie cleared", body = MessageResponse))
)]
pub async fn logout_user() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Json(MessageResponse::new("Signed out")),
    )
}

/// get_me
///
/// [Authenticated Route] Echoes the identity carried by the caller's token.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Session", body = SessionInfo),
        (status = 401, description = "No session", body = MessageResponse)
    )
)]
pub async fn get_me(session: AuthSession) -> Json<SessionInfo> {
    Json(SessionInfo {
        id: session.id,
        email: session.email,
        role: session.role,
        expires_at: session.expires_at,
    })
}

/// get_profile
///
/// [Authenticated Route] The stored account behind the caller's token.
#[utoipa::path(
    get,
    path = "/api/me/profile",
    responses(
        (status = 200, description = "Profile", body = AccountProfile),
        (status = 404, description = "Account removed", body = MessageResponse)
    )
)]
pub async fn get_profile(
    AuthSession { id, .. }: AuthSession,
    State(state): State<AppState>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = state
        .repo
        .find_account(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
    Ok(Json(account.profile()))
}

// --- Editorial content, shared by blogs and news ---

async fn list_content(state: &AppState, kind: ContentKind) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.repo.list_articles(kind).await?))
}

async fn get_content(state: &AppState, kind: ContentKind, id: Uuid) -> Result<Json<Article>, AppError> {
    state
        .repo
        .get_article(kind, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

async fn create_content(
    state: &AppState,
    session: &AuthSession,
    kind: ContentKind,
    payload: CreateContentRequest,
) -> Result<(StatusCode, Json<Article>), AppError> {
    if !payload.is_complete() {
        return Err(AppError::Validation("Title and body are required".to_string()));
    }
    let article = state.repo.create_article(kind, payload).await?;
    tracing::info!(kind = kind.label(), id = %article.id, actor = %session.id, "content created");
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update_content(
    state: &AppState,
    session: &AuthSession,
    kind: ContentKind,
    id: Uuid,
    payload: UpdateContentRequest,
) -> Result<Json<Article>, AppError> {
    let article = state
        .repo
        .update_article(kind, id, payload)
        .await?
        .ok_or_else(|| not_found(kind))?;
    tracing::info!(kind = kind.label(), %id, actor = %session.id, "content updated");
    Ok(Json(article))
}

async fn delete_content(
    state: &AppState,
    session: &AuthSession,
    kind: ContentKind,
    id: Uuid,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.repo.delete_article(kind, id).await? {
        return Err(not_found(kind));
    }
    tracing::info!(kind = kind.label(), %id, actor = %session.id, "content deleted");
    Ok(Json(MessageResponse::new(format!("{} deleted successfully", kind.label()))))
}

fn not_found(kind: ContentKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.label()))
}

/// list_blogs
///
/// [Public Route] All blog posts, newest first.
#[utoipa::path(get, path = "/api/blogs", responses((status = 200, description = "Blogs", body = [Article])))]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    list_content(&state, ContentKind::Blog).await
}

/// get_blog
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    get_content(&state, ContentKind::Blog, id).await
}

/// create_blog
///
/// [Admin Route]
#[utoipa::path(
    post,
    path = "/api/admin/blogs",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Article),
        (status = 400, description = "Missing fields", body = MessageResponse)
    )
)]
pub async fn create_blog(
    session: AuthSession,
    State(state): State<AppState>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    create_content(&state, &session, ContentKind::Blog, payload).await
}

/// update_blog
///
/// [Admin Route]
#[utoipa::path(
    put,
    path = "/api/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Article),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn update_blog(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Article>, AppError> {
    update_content(&state, &session, ContentKind::Blog, id, payload).await
}

/// delete_blog
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/admin/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn delete_blog(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_content(&state, &session, ContentKind::Blog, id).await
}

/// list_news
///
/// [Public Route] All news articles, newest first.
#[utoipa::path(get, path = "/api/news", responses((status = 200, description = "News", body = [Article])))]
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    list_content(&state, ContentKind::News).await
}

/// get_news
#[utoipa::path(
    get,
    path = "/api/news/{id}",
    params(("id" = Uuid, Path, description = "News ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    get_content(&state, ContentKind::News, id).await
}

/// create_news
///
/// [Admin Route]
#[utoipa::path(
    post,
    path = "/api/admin/news",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Article),
        (status = 400, description = "Missing fields", body = MessageResponse)
    )
)]
pub async fn create_news(
    session: AuthSession,
    State(state): State<AppState>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    create_content(&state, &session, ContentKind::News, payload).await
}

/// update_news
///
/// [Admin Route]
#[utoipa::path(
    put,
    path = "/api/admin/news/{id}",
    params(("id" = Uuid, Path, description = "News ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Article),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn update_news(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Article>, AppError> {
    update_content(&state, &session, ContentKind::News, id, payload).await
}

/// delete_news
///
/// [Admin Route]
#[utoipa::path(
    delete,
    path = "/api/admin/news/{id}",
    params(("id" = Uuid, Path, description = "News ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = MessageResponse)
    )
)]
pub async fn delete_news(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_content(&state, &session, ContentKind::News, id).await
}

// --- Contact ---

/// submit_contact
///
/// [Public Route] Stores a contact-form message. First name, email and message are required.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Stored", body = ContactMessage),
        (status = 400, description = "Missing fields", body = MessageResponse)
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    if !payload.is_complete() {
        return Err(AppError::Validation(
            "First name, email, and message are required.".to_string(),
        ));
    }
    let contact = state.repo.create_contact(payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// list_contacts
///
/// [Admin Route] Contact-form inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/contacts",
    responses((status = 200, description = "Messages", body = [ContactMessage]))
)]
pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<ContactMessage>>, AppError> {
    Ok(Json(state.repo.list_contacts().await?))
}

// --- Dashboard ---

/// get_admin_stats
///
/// [Admin Route] Document counts for the dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Stats", body = SiteStats),
        (status = 401, description = "No session", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Result<Json<SiteStats>, AppError> {
    Ok(Json(state.repo.stats().await?))
}

// --- Redirect targets ---

/// Landing point for the guard's sign-in redirect. Page rendering lives in the frontend.
pub async fn sign_in_page() -> Json<MessageResponse> {
    Json(MessageResponse::new("Please sign in to continue"))
}

/// Landing point for the guard's forbidden redirect.
pub async fn unauthorized_page() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(MessageResponse::new("You do not have permission to view this page.")),
    )
}
