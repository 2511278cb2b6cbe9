/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: claims (best-effort decode) / access (role guard)
 * - http / cors / security_headers: transport 層の共通設定
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
