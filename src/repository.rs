use crate::models::{
    Account, Article, ContactMessage, ContactRequest, ContentKind, CreateContentRequest, Role,
    SiteStats, UpdateContentRequest, normalize_email,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// RepositoryError
///
/// Store failures. Everything except `Conflict` is opaque to callers and ends up as a 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The persistence contract used by handlers and the login flow. Shared as
/// `Arc<dyn Repository>` across Axum's task boundaries, hence `Send + Sync`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>>;
    /// Fails with `Conflict` when the email is already registered.
    async fn create_account(&self, account: Account) -> RepoResult<Account>;

    // --- Editorial content (blogs and news) ---
    /// Newest first.
    async fn list_articles(&self, kind: ContentKind) -> RepoResult<Vec<Article>>;
    async fn get_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<Option<Article>>;
    async fn create_article(&self, kind: ContentKind, req: CreateContentRequest) -> RepoResult<Article>;
    /// Writes only the fields that are `Some`. `None` when the article does not exist.
    async fn update_article(
        &self,
        kind: ContentKind,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> RepoResult<Option<Article>>;
    /// True when a row was removed.
    async fn delete_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<bool>;

    // --- Contact form ---
    async fn create_contact(&self, req: ContactRequest) -> RepoResult<ContactMessage>;
    async fn list_contacts(&self) -> RepoResult<Vec<ContactMessage>>;

    // --- Dashboard ---
    async fn stats(&self) -> RepoResult<SiteStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Raw `accounts` row. `role` is nullable for rows that predate roles.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_stored(row.role.as_deref()),
            created_at: row.created_at,
        }
    }
}

fn map_unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(message.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

pub const MSG_EMAIL_TAKEN: &str = "Email is already registered";

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn count(&self, table: &str) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM accounts WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    /// create_account
    ///
    /// Relies on the UNIQUE constraint on `email` so concurrent registrations of the
    /// same address cannot both succeed.
    async fn create_account(&self, account: Account) -> RepoResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"INSERT INTO accounts (id, name, email, password_hash, role, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, name, email, password_hash, role, created_at"#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, MSG_EMAIL_TAKEN))?;
        Ok(row.into())
    }

    async fn list_articles(&self, kind: ContentKind) -> RepoResult<Vec<Article>> {
        let sql = format!(
            "SELECT id, title, body, created_at, updated_at FROM {} ORDER BY created_at DESC",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Article>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<Option<Article>> {
        let sql = format!(
            "SELECT id, title, body, created_at, updated_at FROM {} WHERE id = $1",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_article(&self, kind: ContentKind, req: CreateContentRequest) -> RepoResult<Article> {
        let sql = format!(
            r#"INSERT INTO {} (id, title, body, created_at, updated_at)
               VALUES ($1, $2, $3, NOW(), NOW())
               RETURNING id, title, body, created_at, updated_at"#,
            kind.table()
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.title)
            .bind(req.body)
            .fetch_one(&self.pool)
            .await?)
    }

    /// update_article
    ///
    /// `COALESCE` keeps the current column value for every field left as `None`.
    async fn update_article(
        &self,
        kind: ContentKind,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> RepoResult<Option<Article>> {
        let sql = format!(
            r#"UPDATE {}
               SET title = COALESCE($2, title),
                   body = COALESCE($3, body),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING id, title, body, created_at, updated_at"#,
            kind.table()
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.body)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let res = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_contact(&self, req: ContactRequest) -> RepoResult<ContactMessage> {
        Ok(sqlx::query_as::<_, ContactMessage>(
            r#"INSERT INTO contacts (id, first_name, last_name, email, phone, message, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW())
               RETURNING id, first_name, last_name, email, phone, message, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(req.first_name)
        .bind(req.last_name)
        .bind(req.email)
        .bind(req.phone)
        .bind(req.message)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_contacts(&self) -> RepoResult<Vec<ContactMessage>> {
        Ok(sqlx::query_as::<_, ContactMessage>(
            "SELECT id, first_name, last_name, email, phone, message, created_at FROM contacts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// stats
    ///
    /// Three independent counters fetched concurrently.
    async fn stats(&self) -> RepoResult<SiteStats> {
        let (blog_count, news_count, user_count) = tokio::try_join!(
            self.count(ContentKind::Blog.table()),
            self.count(ContentKind::News.table()),
            self.count("accounts"),
        )?;
        Ok(SiteStats {
            blog_count,
            news_count,
            user_count,
        })
    }
}

/// MemoryRepository
///
/// In-process `Repository` used by the test suites and for running the service
/// without a database (`DATABASE_URL=memory://`). Data is lost on restart.
#[derive(Default)]
pub struct MemoryRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
    articles: RwLock<HashMap<(ContentKind, Uuid), Article>>,
    contacts: RwLock<Vec<ContactMessage>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn create_account(&self, account: Account) -> RepoResult<Account> {
        // Check and insert under one write lock, mirroring the UNIQUE constraint.
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict(MSG_EMAIL_TAKEN.to_string()));
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn list_articles(&self, kind: ContentKind) -> RepoResult<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut list: Vec<Article> = articles
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, a)| a.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn get_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<Option<Article>> {
        Ok(self.articles.read().await.get(&(kind, id)).cloned())
    }

    async fn create_article(&self, kind: ContentKind, req: CreateContentRequest) -> RepoResult<Article> {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            title: req.title,
            body: req.body,
            created_at: now,
            updated_at: now,
        };
        self.articles
            .write()
            .await
            .insert((kind, article.id), article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        kind: ContentKind,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> RepoResult<Option<Article>> {
        let mut articles = self.articles.write().await;
        let Some(article) = articles.get_mut(&(kind, id)) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            article.title = title;
        }
        if let Some(body) = req.body {
            article.body = body;
        }
        article.updated_at = Utc::now();
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, kind: ContentKind, id: Uuid) -> RepoResult<bool> {
        Ok(self.articles.write().await.remove(&(kind, id)).is_some())
    }

    async fn create_contact(&self, req: ContactRequest) -> RepoResult<ContactMessage> {
        let contact = ContactMessage {
            id: Uuid::new_v4(),
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            message: req.message,
            created_at: Utc::now(),
        };
        self.contacts.write().await.push(contact.clone());
        Ok(contact)
    }

    async fn list_contacts(&self) -> RepoResult<Vec<ContactMessage>> {
        let mut list = self.contacts.read().await.clone();
        list.reverse();
        Ok(list)
    }

    async fn stats(&self) -> RepoResult<SiteStats> {
        let articles = self.articles.read().await;
        let count_of = |kind: ContentKind| articles.keys().filter(|(k, _)| *k == kind).count() as i64;
        Ok(SiteStats {
            blog_count: count_of(ContentKind::Blog),
            news_count: count_of(ContentKind::News),
            user_count: self.accounts.read().await.len() as i64,
        })
    }
}
