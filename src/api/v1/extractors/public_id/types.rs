/**
 * Responsibility
 *
 * 主な責務
 *  - リソースごとの「意味付きID型」を宣言する
 *
 * 置くもの
 *  - HomeTag などのタグ型
 *  - type PublicHomeId = PublicId<HomeTag> のような alias
 *
 * 置かないもの
 *  - decode ロジック
 *  - extractor 実装
 */
use super::core::PublicId;

// homes
pub enum HomeTag {}
pub type PublicHomeId = PublicId<HomeTag>;
