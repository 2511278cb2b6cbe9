/*
 * Responsibility
 * - buyer → realtor の問い合わせ (messages) の保存と一覧
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub message: String,
    pub home_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct InquiryRow {
    pub message: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
}

pub async fn create(
    db: &PgPool,
    home_id: i64,
    realtor_id: i64,
    buyer_id: i64,
    message: &str,
) -> RepoResult<MessageRow> {
    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        INSERT INTO messages (message, home_id, realtor_id, buyer_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, message, home_id
        "#,
    )
    .bind(message)
    .bind(home_id)
    .bind(realtor_id)
    .bind(buyer_id)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn list_by_home(db: &PgPool, home_id: i64) -> RepoResult<Vec<InquiryRow>> {
    let rows = sqlx::query_as::<_, InquiryRow>(
        r#"
        SELECT
            m.message,
            u.name AS buyer_name,
            u.email AS buyer_email,
            u.phone AS buyer_phone
        FROM messages m
        JOIN users u ON u.id = m.buyer_id
        WHERE m.home_id = $1
        ORDER BY m.id
        "#,
    )
    .bind(home_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
