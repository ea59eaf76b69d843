/*
 * Responsibility
 * - Items の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 * - ownerId はレスポンスに出さない (呼び出し元 = owner が保証されている)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::item_repo::ItemRow;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub due_date: DateTime<Utc>,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > 256 {
            return Err("name must be <= 256 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: Option<bool>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(name) = &self.name
            && name.len() > 256
        {
            return Err("name must be <= 256 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub due_date: DateTime<Utc>,
    pub done: bool,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemResponse {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.item_id,
            name: row.name,
            due_date: row.due_date,
            done: row.done,
            attachment_url: row.attachment_url,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_non_blank_name() {
        let req = CreateItemRequest {
            name: "   ".to_string(),
            due_date: Utc::now(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_accepts_absent_fields() {
        let req = UpdateItemRequest {
            name: None,
            due_date: None,
            done: Some(true),
        };
        assert!(req.validate().is_ok());
    }
}
