/*
 * Responsibility
 * - v1 の公開ポイント (routes() / role_declarations() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{PREFIX, role_declarations, routes};
