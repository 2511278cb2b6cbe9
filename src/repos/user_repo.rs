/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - email は一意 (UNIQUE 違反は RepoError::Conflict)
 * - access guard 用の role 参照 (find_role) は毎回 DB を読む
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    // argon2 hash
    pub password: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub id: i64,
    pub user_type: String,
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub user_type: &'a str,
}

pub async fn create(db: &PgPool, user: NewUser<'_>) -> RepoResult<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, phone, password, user_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, password
        "#,
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.phone)
    .bind(user.password_hash)
    .bind(user.user_type)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, password
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_role(db: &PgPool, user_id: i64) -> RepoResult<Option<UserRoleRow>> {
    let row = sqlx::query_as::<_, UserRoleRow>(
        r#"
        SELECT id, user_type
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
