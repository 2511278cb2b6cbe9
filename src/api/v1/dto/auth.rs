/*
 * Responsibility
 * - signup / signin / product key / me の request/response DTO
 * - validate() は形式チェックのみ (存在確認などは handler 側)
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::Role;

pub const PASSWORD_MIN_LEN: usize = 5;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub product_key: Option<String>,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if !is_valid_phone(&self.phone) {
            return Err("please insert valid phone number");
        }
        if !is_valid_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err("password must be at least 5 chars");
        }
        if let Some(key) = &self.product_key
            && key.trim().is_empty()
        {
            return Err("product_key cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_valid_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductKeyRequest {
    pub email: String,
    pub user_type: Role,
}

impl ProductKeyRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !is_valid_email(&self.email) {
            return Err("email is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProductKeyResponse {
    pub product_key: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

// Vietnamese mobile numbers: `84` or `03/05/07/08/09`, then 8 digits.
fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let rest = if let Some(rest) = phone.strip_prefix("84") {
        rest
    } else if phone.len() >= 2
        && phone.starts_with('0')
        && matches!(phone.as_bytes()[1], b'3' | b'5' | b'7' | b'8' | b'9')
    {
        &phone[2..]
    } else {
        return false;
    };
    rest.len() == 8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            name: "kiet".to_string(),
            phone: "0912345678".to_string(),
            email: "kiet@example.com".to_string(),
            password: "hunter2".to_string(),
            product_key: None,
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert_eq!(signup().validate(), Ok(()));
    }

    #[test]
    fn signup_field_checks() {
        let mut req = signup();
        req.name = "  ".to_string();
        assert!(req.validate().is_err());

        let mut req = signup();
        req.phone = "0212345678".to_string();
        assert!(req.validate().is_err());

        let mut req = signup();
        req.password = "abcd".to_string();
        assert!(req.validate().is_err());

        let mut req = signup();
        req.product_key = Some(String::new());
        assert!(req.validate().is_err());
    }

    #[test]
    fn phone_formats() {
        assert!(is_valid_phone("8412345678"));
        assert!(is_valid_phone("0812345678"));
        assert!(!is_valid_phone("081234567"));
        assert!(!is_valid_phone("0112345678"));
        assert!(!is_valid_phone("08-1234567"));
    }

    #[test]
    fn email_formats() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert_eq!(normalize_email("  Kiet@Example.COM "), "kiet@example.com");
    }
}
