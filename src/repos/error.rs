/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - infrastructure 障害は Db のまま伝え、呼び出し側で 5xx に写す
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}
