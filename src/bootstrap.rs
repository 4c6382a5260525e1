use crate::{
    config::BootstrapAdmin,
    models::{Account, Role},
    password::{PasswordError, hash_password},
    repository::{Repository, RepositoryError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] RepositoryError),
    #[error(transparent)]
    Hashing(#[from] PasswordError),
}

/// ensure_admin
///
/// Creates the configured privileged account if no account with that email exists.
/// An existing account is left untouched, including its role and password.
/// Returns true when an account was created.
pub async fn ensure_admin(
    repo: &dyn Repository,
    admin: &BootstrapAdmin,
) -> Result<bool, BootstrapError> {
    if repo.find_account_by_email(&admin.email).await?.is_some() {
        tracing::debug!("bootstrap admin already present");
        return Ok(false);
    }

    let hash = hash_password(&admin.password).await?;
    let account = Account::new(
        "Administrator".to_string(),
        &admin.email,
        hash,
        Some(Role::Privileged),
    );
    match repo.create_account(account).await {
        Ok(created) => {
            tracing::info!(account_id = %created.id, "bootstrap admin created");
            Ok(true)
        }
        // Another instance won the race.
        Err(RepositoryError::Conflict(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
