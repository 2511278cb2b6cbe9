/*!
 * Best-effort caller identity
 *
 * Responsibility:
 * - claims middleware が署名を検証せずに decode した Claim を handler に渡す
 * - 認可には使わない (誰が呼んだか「かもしれない」程度の情報)
 * - 絶対に reject しない: header が無い/壊れている場合は CurrentUser(None)
 */
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::auth::Claim;

#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Claim>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}
