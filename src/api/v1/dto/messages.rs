/*
 * Responsibility
 * - 問い合わせ (inquire) と、realtor 向け一覧の DTO
 */
use serde::{Deserialize, Serialize};

pub const MESSAGE_MAX_LEN: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct InquireRequest {
    pub message: String,
}

impl InquireRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.message.trim().is_empty() {
            return Err("message is required");
        }
        if self.message.chars().count() > MESSAGE_MAX_LEN {
            return Err("message must be <= 2000 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub home_id: String, // encoded
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BuyerResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub message: String,
    pub buyer: BuyerResponse,
}
