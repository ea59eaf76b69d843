//! Bearer token verification against the process trust anchor.
//!
//! The pipeline is strict: extract → decode → verify. Any failing stage
//! aborts with a typed `VerifyError`; the HTTP layer collapses every
//! variant to 401 so a caller cannot probe which stage rejected it.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::services::auth::trust_anchor::TrustAnchor;

/// The only signature scheme the anchor key is used for.
const ACCEPTED_ALGORITHM: &str = "RS256";

/// Verification failures, in pipeline order.
///
/// All of these are terminal: no retry, no resource access, no partial
/// state. `CallerIdentity` can only come out of a fully successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("authorization header is missing or empty")]
    MissingCredential,
    #[error("authorization header is not a bearer credential")]
    MalformedCredential,
    #[error("token is not a three-segment signed token")]
    MalformedToken,
    #[error("token signature does not match the trust anchor")]
    SignatureInvalid,
    #[error("token is expired")]
    TokenExpired,
    #[error("token declares an unsupported signing algorithm")]
    UnsupportedAlgorithm,
}

impl VerifyError {
    fn from_jwt(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::MalformedToken,
            // InvalidSignature and the backend's crypto errors both mean
            // the anchor key did not produce this signature.
            _ => Self::SignatureInvalid,
        }
    }
}

/// Decoded (unverified) token header. Only `alg` is consumed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
}

/// Claims consumed from the token: subject plus the temporal pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// The verified claims payload. Produced only by `TokenVerifier::verify`.
///
/// `sub` stays an opaque string: ownership downstream is exact string
/// equality, and upstream subjects carry issuer prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub sub: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// RS256 bearer-token verifier, pinned to a single trust anchor.
#[derive(Clone)]
pub struct TokenVerifier {
    trust_anchor: Arc<dyn TrustAnchor>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(trust_anchor: Arc<dyn TrustAnchor>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = leeway_seconds;
        // `sub`/`exp`/`iat` are the claims we consume; `aud`/`iss` are not
        // part of this trust model, so tokens carrying them must not fail.
        validation.validate_aud = false;

        Self {
            trust_anchor,
            validation,
        }
    }

    /// Strip the bearer scheme from an `Authorization` header value.
    pub fn extract_token(credential: Option<&str>) -> Result<&str, VerifyError> {
        let credential = credential
            .filter(|v| !v.is_empty())
            .ok_or(VerifyError::MissingCredential)?;

        let (scheme, token) = credential
            .split_once(' ')
            .ok_or(VerifyError::MalformedCredential)?;

        if !scheme.eq_ignore_ascii_case("Bearer") {
            return Err(VerifyError::MalformedCredential);
        }

        Ok(token)
    }

    /// Parse the three-segment structure without checking the signature.
    ///
    /// This is metadata inspection only. Nothing decoded here is trusted
    /// until `verify` has run against the anchor.
    pub fn decode(token: &str) -> Result<(TokenHeader, Claims), VerifyError> {
        let mut segments = token.split('.');
        let (Some(header), Some(claims), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(VerifyError::MalformedToken);
        };

        let header: TokenHeader = decode_segment(header)?;
        let claims: Claims = decode_segment(claims)?;

        Ok((header, claims))
    }

    /// Verify the signature with the trust anchor's key and return the
    /// claims as a caller identity.
    ///
    /// The declared algorithm is checked against RS256 before any
    /// cryptography runs, so an alg-substitution token is rejected as
    /// `UnsupportedAlgorithm` no matter what its signature contains.
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, VerifyError> {
        let (header, _) = Self::decode(token)?;

        if header.alg != ACCEPTED_ALGORITHM {
            return Err(VerifyError::UnsupportedAlgorithm);
        }

        let data = jsonwebtoken::decode::<Claims>(
            token,
            self.trust_anchor.signing_key(),
            &self.validation,
        )
        .map_err(VerifyError::from_jwt)?;

        Ok(CallerIdentity {
            sub: data.claims.sub,
            issued_at: data.claims.iat,
            expires_at: data.claims.exp,
        })
    }

    /// The full extract → decode → verify pipeline for one request.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<CallerIdentity, VerifyError> {
        let token = Self::extract_token(credential)?;
        self.verify(token)
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, VerifyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VerifyError::MalformedToken)?;

    serde_json::from_slice(&bytes).map_err(|_| VerifyError::MalformedToken)
}
