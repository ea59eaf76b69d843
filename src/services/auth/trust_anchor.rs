/*
 * Responsibility
 * - 署名検証に使う固定の公開鍵 (trust anchor) の供給
 * - 供給源を trait で抽象化し、TokenVerifier からは鍵の出所を見せない
 *
 * Notes
 * - 今の供給源は起動時に読んだ PEM ひとつ (PinnedKey)。ローテーション無し。
 * - 以前検討された remote JWKS fetch はこの trait の別実装として成立するが、
 *   採用しない方針 (embedded anchor 優先)。
 */
use jsonwebtoken::DecodingKey;

/// Source of the fixed public key material used to validate signatures.
///
/// Exactly one anchor per process; implementations are immutable after
/// construction, so sharing across concurrent requests needs no locking.
pub trait TrustAnchor: Send + Sync {
    fn signing_key(&self) -> &DecodingKey;
}

/// The embedded-key strategy: a single RSA public key, parsed once from
/// PEM at startup.
#[derive(Clone)]
pub struct PinnedKey {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for PinnedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("PinnedKey").finish()
    }
}

impl PinnedKey {
    /// `Pem` must contain an RSA public key (the subject key of the
    /// issuer's certificate).
    pub fn from_pem(pem: &str) -> Result<Self, String> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| format!("invalid RSA public key pem: {}", e))?;

        Ok(Self { decoding_key })
    }
}

impl TrustAnchor for PinnedKey {
    fn signing_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
