//! Ownership authorization for item operations.
//!
//! Every mutating handler goes through this one gate instead of carrying
//! its own copy of the check; the ownership rule lives in exactly one
//! place.

use std::sync::Arc;

use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::item_repo::ItemRepository;
use crate::services::auth::verifier::CallerIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    /// Update/Delete touch an existing record and need the ownership check.
    fn is_mutating(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    ResourceNotFound,
    NotOwner,
}

/// Outcome of an authorization evaluation.
///
/// Deny is a decision about the caller; infrastructure failures are NOT
/// decisions and surface as `GateError` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("repository unavailable")]
    RepositoryUnavailable(#[source] RepoError),
}

pub struct AuthorizationGate {
    repo: Arc<dyn ItemRepository>,
}

impl AuthorizationGate {
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    /// Decide whether `identity` may perform `operation` on `target`.
    ///
    /// Create/Read need no target: a verified identity is sufficient, and
    /// the repository is not consulted. Update/Delete resolve the target
    /// (exactly one read) and require `owner_id == identity.sub`, exact
    /// string equality, no hierarchy or delegation.
    ///
    /// The gate never mutates state; the caller performs the operation
    /// only after receiving `Allow`.
    pub async fn authorize(
        &self,
        identity: &CallerIdentity,
        operation: Operation,
        target: Option<Uuid>,
    ) -> Result<Decision, GateError> {
        if !operation.is_mutating() {
            return Ok(Decision::Allow);
        }

        // A mutating operation without a target has nothing to own.
        let Some(item_id) = target else {
            return Ok(Decision::Deny(DenyReason::ResourceNotFound));
        };

        let item = self
            .repo
            .find_by_id(item_id)
            .await
            .map_err(GateError::RepositoryUnavailable)?;

        let decision = match item {
            None => Decision::Deny(DenyReason::ResourceNotFound),
            Some(item) if item.owner_id != identity.sub => Decision::Deny(DenyReason::NotOwner),
            Some(_) => Decision::Allow,
        };

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::repos::item_repo::{ItemChanges, ItemRow, NewItem};

    /// Read-only repository double. Writes are unreachable: the gate must
    /// never mutate anything.
    struct RepoStub {
        items: HashMap<Uuid, ItemRow>,
        reads: AtomicUsize,
    }

    impl RepoStub {
        fn with_items(items: Vec<ItemRow>) -> Self {
            Self {
                items: items.into_iter().map(|i| (i.item_id, i)).collect(),
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemRepository for RepoStub {
        async fn find_by_id(&self, item_id: Uuid) -> Result<Option<ItemRow>, RepoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.get(&item_id).cloned())
        }

        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<ItemRow>, RepoError> {
            unreachable!("gate performs reads by id only")
        }

        async fn insert(&self, _item: NewItem) -> Result<ItemRow, RepoError> {
            unreachable!("gate never mutates")
        }

        async fn update(
            &self,
            _item_id: Uuid,
            _changes: ItemChanges,
        ) -> Result<Option<ItemRow>, RepoError> {
            unreachable!("gate never mutates")
        }

        async fn delete(&self, _item_id: Uuid) -> Result<bool, RepoError> {
            unreachable!("gate never mutates")
        }
    }

    /// Repository whose every call fails, for the infrastructure path.
    struct UnavailableRepo;

    #[async_trait]
    impl ItemRepository for UnavailableRepo {
        async fn find_by_id(&self, _item_id: Uuid) -> Result<Option<ItemRow>, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<ItemRow>, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn insert(&self, _item: NewItem) -> Result<ItemRow, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn update(
            &self,
            _item_id: Uuid,
            _changes: ItemChanges,
        ) -> Result<Option<ItemRow>, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn delete(&self, _item_id: Uuid) -> Result<bool, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }
    }

    fn item(item_id: Uuid, owner: &str) -> ItemRow {
        ItemRow {
            item_id,
            owner_id: owner.to_string(),
            name: "buy milk".to_string(),
            due_date: Utc::now(),
            done: false,
            attachment_url: None,
            created_at: Utc::now(),
        }
    }

    fn identity(sub: &str) -> CallerIdentity {
        CallerIdentity {
            sub: sub.to_string(),
            issued_at: 0,
            expires_at: 0,
        }
    }

    fn gate_with(items: Vec<ItemRow>) -> (AuthorizationGate, Arc<RepoStub>) {
        let repo = Arc::new(RepoStub::with_items(items));
        (AuthorizationGate::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn delete_is_allowed_for_the_owner() {
        let t1 = Uuid::new_v4();
        let (gate, repo) = gate_with(vec![item(t1, "u1")]);

        let decision = gate
            .authorize(&identity("u1"), Operation::Delete, Some(t1))
            .await
            .expect("authorize");

        assert_eq!(decision, Decision::Allow);
        assert_eq!(repo.reads(), 1);
    }

    #[tokio::test]
    async fn update_is_denied_for_non_owners() {
        let t2 = Uuid::new_v4();
        let (gate, _repo) = gate_with(vec![item(t2, "u2")]);

        let decision = gate
            .authorize(&identity("u1"), Operation::Update, Some(t2))
            .await
            .expect("authorize");

        assert_eq!(decision, Decision::Deny(DenyReason::NotOwner));
    }

    #[tokio::test]
    async fn ownership_is_symmetric_in_both_sides() {
        let id = Uuid::new_v4();

        for (owner, caller, expected) in [
            ("u1", "u1", Decision::Allow),
            ("u1", "u2", Decision::Deny(DenyReason::NotOwner)),
            ("u2", "u1", Decision::Deny(DenyReason::NotOwner)),
            ("u2", "u2", Decision::Allow),
        ] {
            let (gate, _repo) = gate_with(vec![item(id, owner)]);
            let decision = gate
                .authorize(&identity(caller), Operation::Delete, Some(id))
                .await
                .expect("authorize");
            assert_eq!(decision, expected, "owner={owner} caller={caller}");
        }
    }

    #[tokio::test]
    async fn unknown_target_is_denied_as_not_found() {
        let (gate, _repo) = gate_with(vec![]);

        let decision = gate
            .authorize(&identity("u1"), Operation::Delete, Some(Uuid::new_v4()))
            .await
            .expect("authorize");

        assert_eq!(decision, Decision::Deny(DenyReason::ResourceNotFound));
    }

    #[tokio::test]
    async fn mutating_without_target_is_denied_without_a_read() {
        let (gate, repo) = gate_with(vec![]);

        let decision = gate
            .authorize(&identity("u1"), Operation::Update, None)
            .await
            .expect("authorize");

        assert_eq!(decision, Decision::Deny(DenyReason::ResourceNotFound));
        assert_eq!(repo.reads(), 0);
    }

    #[tokio::test]
    async fn create_and_read_skip_the_repository() {
        let (gate, repo) = gate_with(vec![]);

        for operation in [Operation::Create, Operation::Read] {
            let decision = gate
                .authorize(&identity("u1"), operation, None)
                .await
                .expect("authorize");
            assert_eq!(decision, Decision::Allow);
        }

        assert_eq!(repo.reads(), 0);
    }

    #[tokio::test]
    async fn repository_failure_is_not_a_deny() {
        let gate = AuthorizationGate::new(Arc::new(UnavailableRepo));

        let result = gate
            .authorize(&identity("u1"), Operation::Delete, Some(Uuid::new_v4()))
            .await;

        assert!(matches!(
            result,
            Err(GateError::RepositoryUnavailable(RepoError::Db(_)))
        ));
    }
}
