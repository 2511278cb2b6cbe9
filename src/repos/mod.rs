/*
 * Responsibility
 * - DB アクセス (sqlx, PgPool を受け取る free function 群)
 * - エラーは RepoError に寄せ、HTTP への変換は AppError 側でやる
 */
pub mod error;
pub mod home_repo;
pub mod message_repo;
pub mod user_repo;
