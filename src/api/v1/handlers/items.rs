/*
 * Responsibility
 * - /items 系 CRUD handler
 * - 認証は middleware 済み (AuthCtx)。mutating 操作は必ず AuthorizationGate を通す
 * - Allow を受け取ってから repo を叩く。Deny/障害時は一切書き込まない
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::items::{CreateItemRequest, ItemResponse, UpdateItemRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::item_repo::{ItemChanges, NewItem},
    services::authz::{Decision, Operation},
    state::AppState,
};

pub async fn list_items(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    match state
        .gate
        .authorize(&ctx.identity, Operation::Read, None)
        .await?
    {
        Decision::Allow => {}
        Decision::Deny(reason) => return Err(reason.into()),
    }

    let rows = state.repo.list_by_owner(ctx.user_id()).await?;
    let res = rows.into_iter().map(ItemResponse::from).collect();

    Ok(Json(res))
}

pub async fn create_item(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::InvalidRequest(m.into()))?;

    match state
        .gate
        .authorize(&ctx.identity, Operation::Create, None)
        .await?
    {
        Decision::Allow => {}
        Decision::Deny(reason) => return Err(reason.into()),
    }

    // New items always belong to the verified caller.
    let row = state
        .repo
        .insert(NewItem {
            owner_id: ctx.user_id().to_string(),
            name: req.name,
            due_date: req.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_item(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|m| AppError::InvalidRequest(m.into()))?;

    match state
        .gate
        .authorize(&ctx.identity, Operation::Update, Some(item_id))
        .await?
    {
        Decision::Allow => {}
        Decision::Deny(reason) => return Err(reason.into()),
    }

    // The gate proved existence, but a concurrent delete can still race us.
    state
        .repo
        .update(
            item_id,
            ItemChanges {
                name: req.name,
                due_date: req.due_date,
                done: req.done,
            },
        )
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_item(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    match state
        .gate
        .authorize(&ctx.identity, Operation::Delete, Some(item_id))
        .await?
    {
        Decision::Allow => {}
        Decision::Deny(reason) => return Err(reason.into()),
    }

    let deleted = state.repo.delete(item_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
