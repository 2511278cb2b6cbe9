/*
 * Responsibility
 * - Access token (HS256 JWT) issue / decode / verify
 * - decode は署名を見ない (CurrentUser 用の best-effort)
 * - verify は署名 + exp を検証し、失敗の種類 (Invalid / Expired) を区別して返す
 */
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 3600 days.
pub const DEFAULT_TTL_SECONDS: u64 = 3600 * 24 * 60 * 60;

/// Payload carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: i64,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct Subject<'a> {
    pub id: i64,
    pub name: &'a str,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("missing or malformed bearer credential")]
    Malformed,
    #[error("invalid credential: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("credential expired")]
    Expired,
    #[error("failed to sign credential: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Shared-secret token codec.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    // decode 用: 署名も exp も見ない
    peek: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl CredentialCodec {
    pub fn new(secret: &str, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);

        let mut peek = Validation::new(Algorithm::HS256);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        peek.set_required_spec_claims::<&str>(&[]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            peek,
            ttl_seconds,
        }
    }

    pub fn issue(&self, subject: Subject<'_>) -> Result<String, CredentialError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the clock read `now`.
    pub fn issue_at(
        &self,
        subject: Subject<'_>,
        now: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let iat = now.timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let claim = Claim {
            id: subject.id,
            name: subject.name.to_string(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claim, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign access token");
            CredentialError::Sign(e)
        })
    }

    /// Best-effort payload read. Neither the signature nor `exp` is checked.
    pub fn decode(&self, token: &str) -> Option<Claim> {
        jsonwebtoken::decode::<Claim>(token, &self.decoding_key, &self.peek)
            .map(|data| data.claims)
            .ok()
    }

    pub fn verify(&self, token: &str) -> Result<Claim, CredentialError> {
        jsonwebtoken::decode::<Claim>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec(secret: &str) -> CredentialCodec {
        CredentialCodec::new(secret, DEFAULT_TTL_SECONDS, 0)
    }

    #[test]
    fn verify_accepts_token_from_same_secret() {
        let codec = codec("s3cret");
        let token = codec.issue(Subject { id: 37, name: "kiet" }).unwrap();

        let claim = codec.verify(&token).unwrap();
        assert_eq!(claim.id, 37);
        assert_eq!(claim.name, "kiet");
        assert_eq!(claim.exp - claim.iat, DEFAULT_TTL_SECONDS as i64);
    }

    #[test]
    fn verify_rejects_foreign_signature_as_invalid() {
        let token = codec("other").issue(Subject { id: 37, name: "kiet" }).unwrap();

        let err = codec("s3cret").verify(&token).unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[test]
    fn verify_reports_expiry_separately() {
        let codec = codec("s3cret");
        let long_ago = Utc::now() - Duration::days(3700);
        let token = codec
            .issue_at(Subject { id: 37, name: "kiet" }, long_ago)
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, CredentialError::Expired));
    }

    #[test]
    fn token_just_past_exp_is_expired() {
        let codec = CredentialCodec::new("s3cret", 60, 0);
        let token = codec
            .issue_at(
                Subject { id: 37, name: "kiet" },
                Utc::now() - Duration::seconds(65),
            )
            .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert!(matches!(err, CredentialError::Expired));
    }

    #[test]
    fn verify_rejects_garbage() {
        let err = codec("s3cret").verify("not-a-token").unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[test]
    fn decode_ignores_signature_and_expiry() {
        let long_ago = Utc::now() - Duration::days(3700);
        let token = codec("other")
            .issue_at(Subject { id: 9, name: "mallory" }, long_ago)
            .unwrap();

        let claim = codec("s3cret").decode(&token).unwrap();
        assert_eq!(claim.id, 9);
        assert_eq!(claim.name, "mallory");
    }

    #[test]
    fn decode_returns_none_on_malformed_input() {
        let codec = codec("s3cret");
        assert!(codec.decode("").is_none());
        assert!(codec.decode("a.b").is_none());
        assert!(codec.decode("a.!!!.c").is_none());
        assert!(codec.decode("a.e30.c").is_none()); // `{}` lacks the claim fields
        assert!(codec.decode("a.b.c.d").is_none());
    }
}
