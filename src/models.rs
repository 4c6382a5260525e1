use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity ---

/// Role
///
/// The RBAC field carried both on the stored account and inside every session token.
/// Serialized as `"user"` / `"admin"`, which is also the value stored in `accounts.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    Standard,
    #[serde(rename = "admin")]
    Privileged,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "user",
            Role::Privileged => "admin",
        }
    }

    /// Maps the stored column value to a role. Rows written before roles existed
    /// (NULL) or with an unrecognized value are treated as `Standard`.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Privileged,
            _ => Role::Standard,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account
///
/// A registered identity as stored in the `accounts` table.
/// Deliberately not `Serialize`: the password hash must never leave the server.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Unique, stored lowercased.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Builds a fresh account. The role defaults to `Standard` here, once, at creation time.
    pub fn new(name: String, email: &str, password_hash: String, role: Option<Role>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: normalize_email(email),
            password_hash,
            role: role.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// AccountProfile
///
/// Public projection of an `Account`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// --- Content ---

/// ContentKind
///
/// The two editorial collections. They share one shape and one set of handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Blog,
    News,
}

impl ContentKind {
    /// Backing table. Only ever one of these two literals, so it is safe to splice into SQL.
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blogs",
            ContentKind::News => "news",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Blog => "Blog",
            ContentKind::News => "News",
        }
    }
}

/// Article
///
/// A blog post or news article. Which collection it lives in is a `ContentKind`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactMessage
///
/// A submission of the public contact form (`contacts` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /api/auth/register. There is no role field: self-registered
/// accounts are always `Standard`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.name) && !is_blank(&self.email) && !self.password.is_empty()
    }
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// CreateContentRequest
///
/// Payload for creating an `Article`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateContentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl CreateContentRequest {
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.title) && !is_blank(&self.body)
    }
}

/// UpdateContentRequest
///
/// Partial update; only provided fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// ContactRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactRequest {
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ContactRequest {
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.first_name) && !is_blank(&self.email) && !is_blank(&self.message)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// --- Responses (Output Schemas) ---

/// RegisterResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// LoginResponse
///
/// The issued token is also set as the `session_token` cookie for page navigation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
    pub user: AccountProfile,
}

/// SessionInfo
///
/// Output of GET /api/me: what the caller's token says about them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionInfo {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

/// SiteStats
///
/// Output schema for the admin dashboard (GET /api/admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SiteStats {
    pub blog_count: i64,
    pub news_count: i64,
    pub user_count: i64,
}

/// MessageResponse
///
/// The `{message}` body used for confirmations and every error response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
