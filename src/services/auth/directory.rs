//! Persistence seam used by the access guard: "who is user N, and what role do they hold now?"
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{error::RepoError, user_repo};
use crate::services::auth::roles::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRole {
    pub id: i64,
    pub role: Role,
}

/// Role source for gated requests.
///
/// - `Ok(Some(_))`: user exists
/// - `Ok(None)`: no such user (deleted, or never existed)
/// - `Err(_)`: backend failure (caller must deny)
#[async_trait]
pub trait UserRoleLookup: Send + Sync {
    async fn find_user_role(&self, user_id: i64) -> Result<Option<UserRole>, RepoError>;
}

/// Reads the role straight from `users` on every call.
#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRoleLookup for PgUserDirectory {
    async fn find_user_role(&self, user_id: i64) -> Result<Option<UserRole>, RepoError> {
        let Some(row) = user_repo::find_role(&self.db, user_id).await? else {
            return Ok(None);
        };

        let role = row
            .user_type
            .parse::<Role>()
            .map_err(|_| RepoError::Corrupt("users.user_type"))?;

        Ok(Some(UserRole { id: row.id, role }))
    }
}
