/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - access middleware が guard の判定 (Allowed + grant) を request extensions に格納し、
 *   handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証済み token の subject と、その時点で DB から読んだ role を持つ
 * - role を宣言していない (open な) route では格納されない
 */
use crate::services::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn new(user_id: i64, name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            name: name.into(),
            role,
        }
    }
}
