/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - repo: items repository, verifier: TokenVerifier, gate: AuthorizationGate
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::item_repo::ItemRepository;
use crate::services::auth::TokenVerifier;
use crate::services::authz::AuthorizationGate;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ItemRepository>,
    pub verifier: Arc<TokenVerifier>,
    pub gate: Arc<AuthorizationGate>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn ItemRepository>,
        verifier: Arc<TokenVerifier>,
        gate: Arc<AuthorizationGate>,
    ) -> Self {
        Self {
            repo,
            verifier,
            gate,
        }
    }
}
