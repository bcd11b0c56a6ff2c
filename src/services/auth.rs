use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;

/// Username/password gate backed by bcrypt hashes in the `credentials` table.
#[derive(Clone)]
pub struct Authenticator {
    db: SqlitePool,
    // hashed random secret, checked when the username is unknown
    decoy_hash: String,
}

impl Authenticator {
    pub fn new(db: SqlitePool, cost: u32) -> Result<Self, AppError> {
        let decoy_hash = bcrypt::hash(Uuid::new_v4().to_string(), cost)?;
        Ok(Self { db, decoy_hash })
    }

    /// Unknown usernames and wrong passwords are indistinguishable: both run one
    /// bcrypt verification and return `false`.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        let username = username.trim();

        let stored = match repository::find_password_hash(&self.db, username).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("credential lookup failed: {}", e);
                None
            }
        };

        let (hash, known) = match stored.as_deref().map(std::str::from_utf8) {
            Some(Ok(hash)) => (hash.to_string(), true),
            _ => (self.decoy_hash.clone(), false),
        };

        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| error!("password check task failed: {}", e))
            .ok()
            .and_then(|res| res.map_err(|e| warn!("stored hash rejected: {}", e)).ok())
            .unwrap_or(false);

        let allowed = known && matched;
        if !allowed {
            warn!("login rejected");
        }
        allowed
    }
}

/// Creates the single shared account when the credential store is empty.
/// Returns whether an account was created.
pub async fn ensure_bootstrap_account(
    db: &SqlitePool,
    username: &str,
    password: Option<&str>,
    cost: u32,
) -> Result<bool, AppError> {
    if repository::count_credentials(db).await? > 0 {
        return Ok(false);
    }

    let password = password.ok_or_else(|| {
        AppError::Config("credential store is empty and ADMIN_PASSWORD is not set".to_string())
    })?;

    let hash = bcrypt::hash(password, cost)?;
    repository::insert_credential(db, username.trim(), hash.as_bytes()).await?;
    info!("created bootstrap account '{}'", username.trim());
    Ok(true)
}
