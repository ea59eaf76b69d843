/*!
 * Verified caller context
 *
 * - 検証済みの呼び出し主体 (AuthCtx) を handler に渡す
 * - axum 依存 (FromRequestParts) は core、型は types に分離
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
