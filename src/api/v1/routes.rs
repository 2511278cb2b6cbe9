/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /auth, /homes をまとめる
 * - どの route にどの role が要るかもここで宣言する (role_declarations)
 *   - path は nest 後のフルパス ("/api/v1/...") で書く。access middleware は MatchedPath で引く
 */
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{generate_product_key, me, signin, signup},
    health::health,
    homes::{create_home, delete_home, get_home, inquire, list_homes, list_messages, update_home},
};
use crate::services::auth::{
    Role, RoleRegistry, RoleSet,
    roles::RegistryError,
};
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup/{user_type}", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/key", post(generate_product_key))
        .route("/auth/me", get(me))
        .route("/homes", get(list_homes).post(create_home))
        .route(
            "/homes/{home_id}",
            get(get_home).put(update_home).delete(delete_home),
        )
        .route("/homes/{home_id}/inquire", post(inquire))
        .route("/homes/{home_id}/messages", get(list_messages))
}

/// homes はグループとして REALTOR / ADMIN。閲覧系だけ handler 単位で開放する。
pub fn role_declarations() -> Result<RoleRegistry, RegistryError> {
    RoleRegistry::builder()
        .group("/api/v1/homes", [Role::Realtor, Role::Admin])
        .handler(Method::GET, "/api/v1/homes", RoleSet::open())
        .handler(Method::GET, "/api/v1/homes/{home_id}", RoleSet::open())
        .handler(Method::POST, "/api/v1/homes/{home_id}/inquire", [Role::Buyer])
        .handler(Method::POST, "/api/v1/auth/key", [Role::Admin])
        .build()
}
