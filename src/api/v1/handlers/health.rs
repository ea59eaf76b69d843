/*
 * Responsibility
 * - GET /health (死活確認)
 * - 認証 middleware の外に置く唯一のエンドポイント。token 無しで叩ける
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(body))
}
