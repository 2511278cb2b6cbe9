//! role 宣言のある route に access guard を掛ける → 許可されたら AuthCtx を extensions に入れる
//!
//! - route 一致後に走る必要がある (MatchedPath を使う) ので `route_layer` で適用する
//! - deny の理由はログにだけ残し、クライアントには一律 403 を返す

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::AccessDecision;
use crate::state::AppState;

/// route を登録し終えた Router に適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(path) = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
    else {
        tracing::warn!(uri = %req.uri(), "no matched path; denying");
        return Err(AppError::Forbidden);
    };

    let required = state.roles.required_roles(req.method(), &path);

    match state.guard.check(required, req.headers()).await {
        AccessDecision::Allowed { grant } => {
            if let Some(auth_ctx) = grant {
                tracing::debug!(
                    user_id = auth_ctx.user_id,
                    role = %auth_ctx.role,
                    path = %path,
                    "access granted"
                );
                // middleware → extractor への受け渡し
                req.extensions_mut().insert(auth_ctx);
            }
            Ok(next.run(req).await)
        }
        AccessDecision::Denied { reason } => {
            tracing::warn!(
                method = %req.method(),
                path = %path,
                reason = %reason,
                "access denied"
            );
            Err(AppError::Forbidden)
        }
    }
}
