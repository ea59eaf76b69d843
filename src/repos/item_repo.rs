/*
 * Responsibility
 * - items CRUD と ownership チェック用の読み取り
 * - AuthorizationGate からは trait 越しに使う (テストで差し替え可能)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    #[sqlx(rename = "itemId")]
    pub item_id: Uuid,

    // Opaque subject string from the verified token. Exact match only.
    #[sqlx(rename = "ownerId")]
    pub owner_id: String,

    pub name: String,

    #[sqlx(rename = "dueDate")]
    pub due_date: DateTime<Utc>,

    pub done: bool,

    #[sqlx(rename = "attachmentUrl")]
    pub attachment_url: Option<String>,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub owner_id: String,
    pub name: String,
    pub due_date: DateTime<Utc>,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: Option<bool>,
}

/// Keyed-record repository for items.
///
/// `find_by_id` is the only method the authorization layer depends on;
/// the rest back the CRUD handlers.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_by_id(&self, item_id: Uuid) -> Result<Option<ItemRow>, RepoError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ItemRow>, RepoError>;
    async fn insert(&self, item: NewItem) -> Result<ItemRow, RepoError>;
    async fn update(
        &self,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<Option<ItemRow>, RepoError>;
    async fn delete(&self, item_id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn find_by_id(&self, item_id: Uuid) -> Result<Option<ItemRow>, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT
                "itemId", "ownerId", name, "dueDate", done, "attachmentUrl", "createdAt"
            FROM items
            WHERE "itemId" = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ItemRow>, RepoError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT
                "itemId", "ownerId", name, "dueDate", done, "attachmentUrl", "createdAt"
            FROM items
            WHERE "ownerId" = $1
            ORDER BY "createdAt" DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, item: NewItem) -> Result<ItemRow, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items ("itemId", "ownerId", name, "dueDate", done, "createdAt")
            VALUES ($1, $2, $3, $4, FALSE, now())
            RETURNING
                "itemId", "ownerId", name, "dueDate", done, "attachmentUrl", "createdAt"
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(item.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<Option<ItemRow>, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET
                name = COALESCE($2, name),
                "dueDate" = COALESCE($3, "dueDate"),
                done = COALESCE($4, done)
            WHERE "itemId" = $1
            RETURNING
                "itemId", "ownerId", name, "dueDate", done, "attachmentUrl", "createdAt"
            "#,
        )
        .bind(item_id)
        .bind(changes.name.as_deref())
        .bind(changes.due_date)
        .bind(changes.done)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, item_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM items
            WHERE "itemId" = $1
            "#,
        )
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
