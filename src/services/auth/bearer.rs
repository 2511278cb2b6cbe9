use axum::http::{HeaderMap, header};

use crate::services::auth::credential::CredentialError;

/// Pull `<token>` out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(CredentialError::Malformed)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(CredentialError::Malformed)?;

    if token.is_empty() {
        return Err(CredentialError::Malformed);
    }
    Ok(token)
}
