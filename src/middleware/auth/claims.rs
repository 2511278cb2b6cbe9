//! Bearer token → `CurrentUser` (best-effort) を extensions に入れる
//!
//! - 全リクエストに掛ける。ここでは拒否しない
//! - 署名も exp も見ない (decode のみ)。認可の判断は access middleware が verify して行う
//! - DB には触らない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::CurrentUser;
use crate::services::auth::bearer::bearer_token;
use crate::state::AppState;

/// Router 全体に掛ける (`layer`)。route の一致前に走る。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, claims_middleware))
}

async fn claims_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claim = bearer_token(req.headers())
        .ok()
        .and_then(|token| state.credentials.decode(token));

    if claim.is_none() && req.headers().contains_key(axum::http::header::AUTHORIZATION) {
        tracing::debug!("authorization header present but not decodable");
    }

    req.extensions_mut().insert(CurrentUser(claim));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::RoleRegistry;
    use crate::test_support::{SECRET, StaticUsers, test_state, token_for};

    async fn whoami(CurrentUser(claim): CurrentUser) -> String {
        match claim {
            Some(claim) => format!("{}:{}", claim.id, claim.name),
            None => "anonymous".to_string(),
        }
    }

    fn app() -> Router {
        let state = test_state(Arc::new(StaticUsers::default()), RoleRegistry::default());
        apply(Router::new().route("/whoami", get(whoami)), state.clone()).with_state(state)
    }

    async fn call(auth: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let res = app().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn attaches_decoded_claim() {
        let token = token_for(SECRET, 37);
        let (status, body) = call(Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "37:kiet");
    }

    #[tokio::test]
    async fn unverified_claim_is_still_attached() {
        let token = token_for("some-other-secret", 5);
        let (status, body) = call(Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "5:kiet");
    }

    #[tokio::test]
    async fn never_rejects() {
        for auth in [None, Some("Bearer"), Some("Bearer not-a-jwt"), Some("Basic abc")] {
            let (status, body) = call(auth).await;
            assert_eq!(status, StatusCode::OK, "auth header {auth:?}");
            assert_eq!(body, "anonymous");
        }
    }
}
