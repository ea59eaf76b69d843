/// Factory: build the `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::trust_anchor::PinnedKey;
use crate::services::auth::verifier::TokenVerifier;

pub fn build_token_verifier(config: &Config) -> Result<Arc<TokenVerifier>, AppError> {
    let anchor = PinnedKey::from_pem(&config.trust_anchor_pem).map_err(|e| {
        tracing::warn!(error = %e, "failed to parse trust anchor PEM (expected RSA public key)");
        AppError::Internal
    })?;

    Ok(Arc::new(TokenVerifier::new(
        Arc::new(anchor),
        config.auth_leeway_seconds,
    )))
}
