/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /items の CRUD を nest する。Bearer 必須の範囲は app 側で apply する
 */
use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::items::{create_item, delete_item, list_items, update_item};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_id}", put(update_item).delete(delete_item))
}
