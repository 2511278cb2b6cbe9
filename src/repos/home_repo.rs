/*
 * Responsibility
 * - homes / images CRUD
 * - 一覧は先頭 1 枚の画像だけ、詳細は全画像 + realtor の連絡先
 * - 作成・削除は images と合わせて 1 トランザクション
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct HomeRow {
    pub id: i64,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub land_size: f64,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub property_type: String,
    pub listed_date: DateTime<Utc>,
    pub realtor_id: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct HomeSummaryRow {
    pub id: i64,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub property_type: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RealtorRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Default)]
pub struct HomeFilter<'a> {
    pub city: Option<&'a str>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_type: Option<&'a str>,
}

pub struct NewHome<'a> {
    pub address: &'a str,
    pub city: &'a str,
    pub price: f64,
    pub land_size: f64,
    pub number_of_bedrooms: i32,
    pub number_of_bathrooms: f64,
    pub property_type: &'a str,
    pub realtor_id: i64,
}

#[derive(Debug, Default)]
pub struct HomeChanges<'a> {
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub price: Option<f64>,
    pub land_size: Option<f64>,
    pub number_of_bedrooms: Option<i32>,
    pub number_of_bathrooms: Option<f64>,
    pub property_type: Option<&'a str>,
}

const HOME_COLUMNS: &str = r#"
    id, address, city, price, land_size, number_of_bedrooms, number_of_bathrooms,
    property_type, listed_date, realtor_id
"#;

pub async fn list(db: &PgPool, filter: &HomeFilter<'_>) -> RepoResult<Vec<HomeSummaryRow>> {
    let rows = sqlx::query_as::<_, HomeSummaryRow>(
        r#"
        SELECT
            h.id, h.address, h.city, h.price, h.number_of_bedrooms,
            h.number_of_bathrooms, h.property_type,
            (
                SELECT i.url FROM images i
                WHERE i.home_id = h.id
                ORDER BY i.id
                LIMIT 1
            ) AS image
        FROM homes h
        WHERE ($1::text IS NULL OR h.city = $1)
          AND ($2::float8 IS NULL OR h.price >= $2)
          AND ($3::float8 IS NULL OR h.price <= $3)
          AND ($4::text IS NULL OR h.property_type = $4)
        ORDER BY h.id DESC
        "#,
    )
    .bind(filter.city)
    .bind(filter.min_price)
    .bind(filter.max_price)
    .bind(filter.property_type)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, home_id: i64) -> RepoResult<Option<HomeRow>> {
    let sql = format!("SELECT {HOME_COLUMNS} FROM homes WHERE id = $1");
    let row = sqlx::query_as::<_, HomeRow>(&sql)
        .bind(home_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn images(db: &PgPool, home_id: i64) -> RepoResult<Vec<String>> {
    let urls = sqlx::query_scalar::<_, String>(
        r#"
        SELECT url FROM images
        WHERE home_id = $1
        ORDER BY id
        "#,
    )
    .bind(home_id)
    .fetch_all(db)
    .await?;

    Ok(urls)
}

pub async fn realtor_of(db: &PgPool, home_id: i64) -> RepoResult<Option<RealtorRow>> {
    let row = sqlx::query_as::<_, RealtorRow>(
        r#"
        SELECT u.id, u.name, u.email, u.phone
        FROM homes h
        JOIN users u ON u.id = h.realtor_id
        WHERE h.id = $1
        "#,
    )
    .bind(home_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, home: NewHome<'_>, image_urls: &[String]) -> RepoResult<HomeRow> {
    let mut tx = db.begin().await?;

    let sql = format!(
        r#"
        INSERT INTO homes (
            address, city, price, land_size, number_of_bedrooms,
            number_of_bathrooms, property_type, realtor_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {HOME_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, HomeRow>(&sql)
        .bind(home.address)
        .bind(home.city)
        .bind(home.price)
        .bind(home.land_size)
        .bind(home.number_of_bedrooms)
        .bind(home.number_of_bathrooms)
        .bind(home.property_type)
        .bind(home.realtor_id)
        .fetch_one(&mut *tx)
        .await?;

    if !image_urls.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO images (url, home_id)
            SELECT url, $2 FROM UNNEST($1::text[]) AS url
            "#,
        )
        .bind(image_urls)
        .bind(row.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    home_id: i64,
    changes: &HomeChanges<'_>,
) -> RepoResult<Option<HomeRow>> {
    let sql = format!(
        r#"
        UPDATE homes
        SET
            address = COALESCE($2, address),
            city = COALESCE($3, city),
            price = COALESCE($4, price),
            land_size = COALESCE($5, land_size),
            number_of_bedrooms = COALESCE($6, number_of_bedrooms),
            number_of_bathrooms = COALESCE($7, number_of_bathrooms),
            property_type = COALESCE($8, property_type)
        WHERE id = $1
        RETURNING {HOME_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, HomeRow>(&sql)
        .bind(home_id)
        .bind(changes.address)
        .bind(changes.city)
        .bind(changes.price)
        .bind(changes.land_size)
        .bind(changes.number_of_bedrooms)
        .bind(changes.number_of_bathrooms)
        .bind(changes.property_type)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, home_id: i64) -> RepoResult<bool> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM images WHERE home_id = $1")
        .bind(home_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM messages WHERE home_id = $1")
        .bind(home_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM homes WHERE id = $1")
        .bind(home_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
