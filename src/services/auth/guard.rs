/*
 * Responsibility
 * - route に宣言された role 集合と Authorization ヘッダから allow / deny を決める
 * - 宣言なし (空) → Open: 無条件で allow
 * - 宣言あり → Gated: verify (署名 + exp) → users から現在の role を取得 → 集合に含まれるか
 *
 * Notes
 * - 失敗はすべて Denied に正規化する (fail closed)。理由は DenyReason に残してログ用に使う
 * - role はキャッシュしない。gated なリクエストごとに 1 回 DB を読む
 */
use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::{
    bearer::bearer_token,
    credential::{CredentialCodec, CredentialError},
    directory::UserRoleLookup,
    roles::{Role, RoleSet},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MalformedCredential,
    InvalidCredential,
    ExpiredCredential,
    UnknownSubject { user_id: i64 },
    RoleMismatch { user_id: i64, role: Role },
    LookupFailed { user_id: i64 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCredential => write!(f, "missing or malformed bearer credential"),
            Self::InvalidCredential => write!(f, "credential failed verification"),
            Self::ExpiredCredential => write!(f, "credential expired"),
            Self::UnknownSubject { user_id } => write!(f, "user {} does not exist", user_id),
            Self::RoleMismatch { user_id, role } => {
                write!(f, "user {} has role {} which is not allowed", user_id, role)
            }
            Self::LookupFailed { user_id } => write!(f, "role lookup failed for user {}", user_id),
        }
    }
}

impl From<CredentialError> for DenyReason {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Malformed => Self::MalformedCredential,
            CredentialError::Expired => Self::ExpiredCredential,
            CredentialError::Invalid(_) | CredentialError::Sign(_) => Self::InvalidCredential,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// `grant` is `None` for open routes.
    Allowed { grant: Option<AuthCtx> },
    Denied { reason: DenyReason },
}

impl AccessDecision {
    fn deny(reason: DenyReason) -> Self {
        Self::Denied { reason }
    }
}

#[derive(Clone)]
pub struct AccessGuard {
    codec: Arc<CredentialCodec>,
    users: Arc<dyn UserRoleLookup>,
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl AccessGuard {
    pub fn new(codec: Arc<CredentialCodec>, users: Arc<dyn UserRoleLookup>) -> Self {
        Self { codec, users }
    }

    pub async fn check(&self, required: Option<&RoleSet>, headers: &HeaderMap) -> AccessDecision {
        let roles = match required {
            Some(roles) if !roles.is_empty() => roles,
            _ => return AccessDecision::Allowed { grant: None },
        };

        let token = match bearer_token(headers) {
            Ok(token) => token,
            Err(e) => return AccessDecision::deny(e.into()),
        };

        // verify, never decode: an unsigned claim must not reach the lookup
        let claim = match self.codec.verify(token) {
            Ok(claim) => claim,
            Err(e) => {
                tracing::debug!(error = %e, "access token rejected");
                return AccessDecision::deny(e.into());
            }
        };

        let user = match self.users.find_user_role(claim.id).await {
            Ok(Some(user)) => user,
            Ok(None) => return AccessDecision::deny(DenyReason::UnknownSubject { user_id: claim.id }),
            Err(e) => {
                tracing::error!(error = %e, user_id = claim.id, "role lookup failed");
                return AccessDecision::deny(DenyReason::LookupFailed { user_id: claim.id });
            }
        };

        if !roles.contains(user.role) {
            return AccessDecision::deny(DenyReason::RoleMismatch {
                user_id: user.id,
                role: user.role,
            });
        }

        AccessDecision::Allowed {
            grant: Some(AuthCtx::new(user.id, claim.name, user.role)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderValue, header};
    use chrono::{Duration, Utc};

    use crate::services::auth::credential::Subject;
    use crate::test_support::{SECRET, StaticUsers, codec, token_for};

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn guard(users: Arc<StaticUsers>) -> AccessGuard {
        AccessGuard::new(codec(SECRET), users)
    }

    fn realtors() -> RoleSet {
        RoleSet::from([Role::Realtor])
    }

    fn reason(decision: AccessDecision) -> DenyReason {
        match decision {
            AccessDecision::Denied { reason } => reason,
            AccessDecision::Allowed { .. } => panic!("expected denial"),
        }
    }

    #[tokio::test]
    async fn realtor_with_valid_token_is_allowed() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let headers = bearer(&token_for(SECRET, 37));

        let decision = guard(users.clone()).check(Some(&realtors()), &headers).await;

        match decision {
            AccessDecision::Allowed { grant: Some(ctx) } => {
                assert_eq!(ctx.user_id, 37);
                assert_eq!(ctx.role, Role::Realtor);
                assert_eq!(ctx.name, "kiet");
            }
            other => panic!("unexpected decision: {other:?}"),
        }
        assert_eq!(users.lookups(), 1);
    }

    #[tokio::test]
    async fn buyer_is_denied_on_realtor_route() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Buyer)]));
        let headers = bearer(&token_for(SECRET, 37));

        let decision = guard(users).check(Some(&realtors()), &headers).await;

        assert_eq!(
            reason(decision),
            DenyReason::RoleMismatch {
                user_id: 37,
                role: Role::Buyer
            }
        );
    }

    #[tokio::test]
    async fn foreign_signature_is_denied_even_for_privileged_user() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let headers = bearer(&token_for("wrong-secret", 37));

        let decision = guard(users.clone()).check(Some(&realtors()), &headers).await;

        assert_eq!(reason(decision), DenyReason::InvalidCredential);
        assert_eq!(users.lookups(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_denied_with_its_own_reason() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let token = codec(SECRET)
            .issue_at(
                Subject { id: 37, name: "kiet" },
                Utc::now() - Duration::days(3700),
            )
            .unwrap();

        let decision = guard(users).check(Some(&realtors()), &bearer(&token)).await;

        assert_eq!(reason(decision), DenyReason::ExpiredCredential);
    }

    #[tokio::test]
    async fn token_expired_seconds_ago_is_denied() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let token = CredentialCodec::new(SECRET, 60, 0)
            .issue_at(Subject { id: 37, name: "kiet" }, Utc::now() - Duration::seconds(70))
            .unwrap();

        let decision = guard(users.clone()).check(Some(&realtors()), &bearer(&token)).await;

        assert_eq!(reason(decision), DenyReason::ExpiredCredential);
        assert_eq!(users.lookups(), 0);
    }

    #[tokio::test]
    async fn open_route_allows_without_credentials() {
        let users = Arc::new(StaticUsers::default());
        let guard = guard(users.clone());

        let none = guard.check(None, &HeaderMap::new()).await;
        let empty = guard.check(Some(&RoleSet::open()), &bearer("garbage")).await;

        assert!(matches!(none, AccessDecision::Allowed { grant: None }));
        assert!(matches!(empty, AccessDecision::Allowed { grant: None }));
        assert_eq!(users.lookups(), 0);
    }

    #[tokio::test]
    async fn unknown_user_is_denied() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let headers = bearer(&token_for(SECRET, 9999));

        let decision = guard(users).check(Some(&realtors()), &headers).await;

        assert_eq!(reason(decision), DenyReason::UnknownSubject { user_id: 9999 });
    }

    #[tokio::test]
    async fn missing_header_is_denied_on_gated_route() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));

        let decision = guard(users).check(Some(&realtors()), &HeaderMap::new()).await;

        assert_eq!(reason(decision), DenyReason::MalformedCredential);
    }

    #[tokio::test]
    async fn lookup_failure_fails_closed() {
        let users = Arc::new(StaticUsers {
            broken: true,
            ..StaticUsers::with(&[(37, Role::Realtor)])
        });
        let headers = bearer(&token_for(SECRET, 37));

        let decision = guard(users).check(Some(&realtors()), &headers).await;

        assert_eq!(reason(decision), DenyReason::LookupFailed { user_id: 37 });
    }

    #[tokio::test]
    async fn role_is_read_fresh_on_every_request() {
        let users = Arc::new(StaticUsers::with(&[(37, Role::Realtor)]));
        let guard = guard(users.clone());
        let headers = bearer(&token_for(SECRET, 37));

        for _ in 0..2 {
            let decision = guard.check(Some(&realtors()), &headers).await;
            assert!(matches!(decision, AccessDecision::Allowed { grant: Some(_) }));
        }
        assert_eq!(users.lookups(), 2);
    }
}
