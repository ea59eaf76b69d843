/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証ロジックは middleware/services 側の責務
 * - `identity.sub` は opaque な文字列のまま扱う (ownership は完全一致比較)
 */

use crate::services::auth::CallerIdentity;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: CallerIdentity,
}

impl AuthCtx {
    pub fn new(identity: CallerIdentity) -> Self {
        Self { identity }
    }

    /// The tenant/owner discriminator used by every downstream check.
    pub fn user_id(&self) -> &str {
        &self.identity.sub
    }
}
