/*
 * Responsibility
 * - /auth 系 handler (signup / signin / product key / me)
 * - token 発行は CredentialCodec、password は argon2 (services::auth::password)
 * - BUYER 以外の signup は product key 必須
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::auth::{
            MeResponse, ProductKeyRequest, ProductKeyResponse, SigninRequest, SignupRequest,
            TokenResponse, normalize_email,
        },
        extractors::CurrentUser,
    },
    error::AppError,
    repos::user_repo::{self, NewUser},
    services::auth::{Role, Subject, password},
    state::AppState,
};

pub async fn signup(
    State(state): State<AppState>,
    Path(user_type): Path<String>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let role: Role = user_type
        .parse()
        .map_err(|_| AppError::bad_request("INVALID_USER_TYPE", "unknown user type"))?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let email = normalize_email(&req.email);

    if role != Role::Buyer {
        let key = req.product_key.as_deref().ok_or(AppError::Unauthorized)?;
        if !state.product_keys.verify(key, &email, role) {
            tracing::warn!(role = %role, "signup rejected: invalid product key");
            return Err(AppError::Unauthorized);
        }
    }

    if user_repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::conflict("EMAIL_TAKEN", "email already registered"));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = user_repo::create(
        &state.db,
        NewUser {
            name: req.name.trim(),
            email: &email,
            phone: req.phone.trim(),
            password_hash: &password_hash,
            user_type: role.as_str(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role, "user signed up");

    let token = state.credentials.issue(Subject {
        id: user.id,
        name: &user.name,
    })?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let invalid = || AppError::bad_request("INVALID_CREDENTIALS", "invalid credentials");

    let user = user_repo::find_by_email(&state.db, &normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password) {
        return Err(invalid());
    }

    let token = state.credentials.issue(Subject {
        id: user.id,
        name: &user.name,
    })?;
    Ok(Json(TokenResponse { token }))
}

pub async fn generate_product_key(
    State(state): State<AppState>,
    Json(req): Json<ProductKeyRequest>,
) -> Result<Json<ProductKeyResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let product_key = state
        .product_keys
        .generate(&normalize_email(&req.email), req.user_type)?;

    Ok(Json(ProductKeyResponse { product_key }))
}

/// Returns the caller's decoded (not verified) claim.
pub async fn me(CurrentUser(claim): CurrentUser) -> Result<Json<MeResponse>, AppError> {
    let claim = claim.ok_or(AppError::Unauthorized)?;

    Ok(Json(MeResponse {
        id: claim.id,
        name: claim.name,
        iat: claim.iat,
        exp: claim.exp,
    }))
}
