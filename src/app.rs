/*
 * Responsibility
 * - Config読み込み → 依存生成 (PgPool / credential codec / guard / role 宣言) → Router 組み立て
 * - Middleware の適用順 (claims → access → http / cors / security headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    services::{
        auth::{ProductKeys, build_access_guard, build_credential_codec},
        id_codec::IdCodec,
    },
    state::AppState,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    // RUST_LOG があればそれを優先
    // 例: RUST_LOG=info,realty_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // dev: 即落とす / production: default hook に任せてプロセスは残す
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.database_acquire_timeout)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!()
        .run(&db)
        .await
        .context("run database migrations")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    let credentials = build_credential_codec(config);
    let guard = build_access_guard(credentials.clone(), db.clone());
    let roles = Arc::new(api::v1::role_declarations()?);
    tracing::debug!(?roles, "role declarations loaded");

    Ok(AppState {
        db,
        id_codec,
        credentials,
        guard,
        roles,
        product_keys: ProductKeys::new(config.product_key_secret.clone()),
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    // access は route_layer なので、route を全部登録した後の v1 Router に掛ける
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let router = Router::new().nest(api::v1::PREFIX, v1);
    let router = middleware::auth::claims::apply(router, state.clone()).with_state(state);

    let router = middleware::http::apply(router, REQUEST_TIMEOUT);
    let router = middleware::cors::apply(router, config.app_env, &config.cors_allowed_origins);
    middleware::security_headers::apply(router)
}
