pub mod factory;
#[cfg(test)]
pub mod test_keys;
pub mod trust_anchor;
pub mod verifier;

pub use factory::build_token_verifier;
pub use trust_anchor::{PinnedKey, TrustAnchor};
pub use verifier::{CallerIdentity, TokenVerifier, VerifyError};
