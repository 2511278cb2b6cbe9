/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, id_codec: IdCodec, credentials / guard / roles など
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{
    auth::{AccessGuard, CredentialCodec, ProductKeys, RoleRegistry},
    id_codec::IdCodec,
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub id_codec: IdCodec,
    pub credentials: Arc<CredentialCodec>,
    pub guard: Arc<AccessGuard>,
    pub roles: Arc<RoleRegistry>,
    pub product_keys: ProductKeys,
}
