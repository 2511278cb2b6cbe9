/*
 * Responsibility
 * - /homes 系 CRUD + 問い合わせ handler
 * - Path の {home_id} は公開 ID → PublicHomeId extractor で内部 ID に変換して受け取る
 * - role の判定は access middleware 済み。ここでは「自分の物件か」だけを見る
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::{
            homes::{
                CreateHomeRequest, HomeDetailResponse, HomeQuery, HomeResponse,
                HomeSummaryResponse, PropertyType, RealtorResponse, UpdateHomeRequest,
            },
            messages::{BuyerResponse, InquireRequest, InquiryResponse, MessageResponse},
        },
        extractors::{AuthCtx, AuthCtxExtractor, public_id::PublicHomeId},
    },
    error::AppError,
    repos::{
        error::RepoError,
        home_repo::{self, HomeChanges, HomeFilter, HomeRow, NewHome},
        message_repo,
    },
    state::AppState,
};

fn property_type(raw: &str) -> Result<PropertyType, AppError> {
    PropertyType::parse(raw).ok_or_else(|| RepoError::Corrupt("homes.property_type").into())
}

fn row_to_response(state: &AppState, row: HomeRow) -> Result<HomeResponse, AppError> {
    Ok(HomeResponse {
        id: state.id_codec.encode(row.id)?,
        property_type: property_type(&row.property_type)?,
        address: row.address,
        city: row.city,
        price: row.price,
        land_size: row.land_size,
        number_of_bedrooms: row.number_of_bedrooms,
        number_of_bathrooms: row.number_of_bathrooms,
        listed_date: row.listed_date,
    })
}

/// 物件を登録した realtor 本人だけが通る。role (ADMIN 含む) では上書きしない。
fn ensure_owner(home: &HomeRow, ctx: &AuthCtx) -> Result<(), AppError> {
    if home.realtor_id != ctx.user_id {
        tracing::warn!(
            home_id = home.id,
            user_id = ctx.user_id,
            realtor_id = home.realtor_id,
            "caller does not own this home"
        );
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

async fn owned_home(state: &AppState, home_id: i64, ctx: &AuthCtx) -> Result<HomeRow, AppError> {
    let home = home_repo::get(&state.db, home_id)
        .await?
        .ok_or(AppError::not_found("home"))?;

    ensure_owner(&home, ctx)?;
    Ok(home)
}

pub async fn list_homes(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Result<Json<Vec<HomeSummaryResponse>>, AppError> {
    query
        .validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let filter = HomeFilter {
        city: query.city.as_deref(),
        min_price: query.min_price,
        max_price: query.max_price,
        property_type: query.property_type.as_ref().map(PropertyType::as_str),
    };
    let rows = home_repo::list(&state.db, &filter).await?;

    if rows.is_empty() {
        return Err(AppError::not_found("home"));
    }

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(HomeSummaryResponse {
            id: state.id_codec.encode(row.id)?,
            property_type: property_type(&row.property_type)?,
            address: row.address,
            city: row.city,
            price: row.price,
            number_of_bedrooms: row.number_of_bedrooms,
            number_of_bathrooms: row.number_of_bathrooms,
            image: row.image,
        });
    }

    Ok(Json(res))
}

pub async fn get_home(
    State(state): State<AppState>,
    home_id: PublicHomeId,
) -> Result<Json<HomeDetailResponse>, AppError> {
    let row = home_repo::get(&state.db, home_id.id)
        .await?
        .ok_or(AppError::not_found("home"))?;

    let images = home_repo::images(&state.db, home_id.id).await?;
    let realtor = home_repo::realtor_of(&state.db, home_id.id)
        .await?
        .map(|r| RealtorResponse {
            name: r.name,
            email: r.email,
            phone: r.phone,
        });

    Ok(Json(HomeDetailResponse {
        home: row_to_response(&state, row)?,
        images,
        realtor,
    }))
}

pub async fn create_home(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateHomeRequest>,
) -> Result<(StatusCode, Json<HomeResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let image_urls: Vec<String> = req.images.iter().map(|i| i.url.trim().to_string()).collect();

    let row = home_repo::create(
        &state.db,
        NewHome {
            address: req.address.trim(),
            city: req.city.trim(),
            price: req.price,
            land_size: req.land_size,
            number_of_bedrooms: req.number_of_bedrooms,
            number_of_bathrooms: req.number_of_bathrooms,
            property_type: req.property_type.as_str(),
            realtor_id: ctx.user_id,
        },
        &image_urls,
    )
    .await?;

    tracing::info!(
        home_id = row.id,
        realtor_id = ctx.user_id,
        realtor = %ctx.name,
        "home listed"
    );

    Ok((StatusCode::CREATED, Json(row_to_response(&state, row)?)))
}

pub async fn update_home(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    home_id: PublicHomeId,
    Json(req): Json<UpdateHomeRequest>,
) -> Result<Json<HomeResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    owned_home(&state, home_id.id, &ctx).await?;

    let changes = HomeChanges {
        address: req.address.as_deref().map(str::trim),
        city: req.city.as_deref().map(str::trim),
        price: req.price,
        land_size: req.land_size,
        number_of_bedrooms: req.number_of_bedrooms,
        number_of_bathrooms: req.number_of_bathrooms,
        property_type: req.property_type.as_ref().map(PropertyType::as_str),
    };
    let row = home_repo::update(&state.db, home_id.id, &changes)
        .await?
        .ok_or(AppError::not_found("home"))?;

    Ok(Json(row_to_response(&state, row)?))
}

pub async fn delete_home(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    home_id: PublicHomeId,
) -> Result<StatusCode, AppError> {
    owned_home(&state, home_id.id, &ctx).await?;

    if home_repo::delete(&state.db, home_id.id).await? {
        tracing::info!(home_id = home_id.id, user_id = ctx.user_id, "home deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("home"))
    }
}

pub async fn inquire(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    home_id: PublicHomeId,
    Json(req): Json<InquireRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let realtor = home_repo::realtor_of(&state.db, home_id.id)
        .await?
        .ok_or(AppError::not_found("home"))?;

    let row = message_repo::create(
        &state.db,
        home_id.id,
        realtor.id,
        ctx.user_id,
        req.message.trim(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            id: row.id,
            home_id: state.id_codec.encode(row.home_id)?,
            message: row.message,
        }),
    ))
}

pub async fn list_messages(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    home_id: PublicHomeId,
) -> Result<Json<Vec<InquiryResponse>>, AppError> {
    owned_home(&state, home_id.id, &ctx).await?;

    let rows = message_repo::list_by_home(&state.db, home_id.id).await?;
    let res = rows
        .into_iter()
        .map(|m| InquiryResponse {
            message: m.message,
            buyer: BuyerResponse {
                name: m.buyer_name,
                email: m.buyer_email,
                phone: m.buyer_phone,
            },
        })
        .collect();

    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::services::auth::Role;

    fn home_listed_by(realtor_id: i64) -> HomeRow {
        HomeRow {
            id: 5,
            address: "2133 Su Van Hanh District 10".to_string(),
            city: "Ho Chi Minh".to_string(),
            price: 50_000_000_000.0,
            land_size: 120.0,
            number_of_bedrooms: 4,
            number_of_bathrooms: 2.5,
            property_type: "RESIDENTIAL".to_string(),
            listed_date: Utc::now(),
            realtor_id,
        }
    }

    #[test]
    fn listing_realtor_owns_the_home() {
        let ctx = AuthCtx::new(37, "kiet", Role::Realtor);
        assert!(ensure_owner(&home_listed_by(37), &ctx).is_ok());
    }

    #[test]
    fn other_realtor_is_unauthorized() {
        let ctx = AuthCtx::new(38, "lan", Role::Realtor);
        let err = ensure_owner(&home_listed_by(37), &ctx).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn admin_does_not_bypass_ownership() {
        let ctx = AuthCtx::new(1, "admin", Role::Admin);
        let err = ensure_owner(&home_listed_by(37), &ctx).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn admin_who_listed_the_home_owns_it() {
        let ctx = AuthCtx::new(1, "admin", Role::Admin);
        assert!(ensure_owner(&home_listed_by(1), &ctx).is_ok());
    }
}
