/// Factory: build auth services from application `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::auth::{AccessGuard, CredentialCodec, PgUserDirectory};

pub fn build_credential_codec(config: &Config) -> Arc<CredentialCodec> {
    Arc::new(CredentialCodec::new(
        &config.jwt_secret,
        config.access_token_ttl_seconds,
        config.access_token_leeway_seconds,
    ))
}

pub fn build_access_guard(codec: Arc<CredentialCodec>, db: PgPool) -> Arc<AccessGuard> {
    let users = Arc::new(PgUserDirectory::new(db));
    Arc::new(AccessGuard::new(codec, users))
}
