use thiserror::Error;
use tokio::sync::OnceCell;

/// bcrypt work factor. Matches the cost existing account hashes were created with.
pub const HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hashes a plaintext password on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST)).await??;
    Ok(hashed)
}

/// Compares a plaintext password against a stored bcrypt hash.
///
/// A stored value that is not a valid bcrypt hash counts as a mismatch, not an error:
/// the caller cannot do anything useful with the difference.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            Ok(false)
        }
    }
}

static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

/// A valid hash at `HASH_COST` that no login password is expected to match.
/// Verifying against it costs the same as verifying against a real account.
pub async fn dummy_hash() -> Result<&'static str, PasswordError> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_password("no-account-has-this-password"))
        .await?;
    Ok(hash.as_str())
}
