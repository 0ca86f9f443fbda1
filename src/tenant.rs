//! Tenant boundary.
//!
//! Every repository call receives a [`TenantContext`] explicitly. Reads are
//! filtered by `store_id`; a row that exists but belongs to a different store
//! is reported as [`AppError::Forbidden`], never as an empty result.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        store_members::{Column as MemberCol, Entity as StoreMembers, MemberRole},
        stores::{Column as StoreCol, Entity as Stores},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantContext {
    pub user_id: Uuid,
    /// The currently selected store. All writes are stamped with it.
    pub store_id: Uuid,
    pub role: MemberRole,
    pub store_ids_accessible: Vec<Uuid>,
}

impl TenantContext {
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }

    pub fn is_owner_of(&self, store_id: Uuid) -> bool {
        self.is_owner() && self.store_ids_accessible.contains(&store_id)
    }

    pub fn ensure_owner(&self) -> AppResult<()> {
        if !self.is_owner_of(self.store_id) {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// Fails closed when a loaded row carries another store's id.
    pub fn ensure_store(&self, row_store_id: Uuid) -> AppResult<()> {
        if row_store_id != self.store_id {
            tracing::warn!(
                user_id = %self.user_id,
                store_id = %self.store_id,
                "cross-store access rejected"
            );
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

/// Resolves which stores `user` may act on and which one is selected.
///
/// Owners reach every active store they own; staff reach exactly one, their
/// oldest active assignment. Without an explicit selection the first
/// accessible store is used.
pub async fn resolve<C>(
    conn: &C,
    user: &AuthUser,
    selected: Option<Uuid>,
) -> AppResult<TenantContext>
where
    C: ConnectionTrait,
{
    let memberships = StoreMembers::find()
        .filter(MemberCol::UserId.eq(user.user_id))
        .order_by_asc(MemberCol::CreatedAt)
        .all(conn)
        .await?;

    let store_ids: Vec<Uuid> = memberships.iter().map(|m| m.store_id).collect();
    let active: Vec<Uuid> = Stores::find()
        .filter(StoreCol::Id.is_in(store_ids))
        .filter(StoreCol::IsActive.eq(true))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let active_memberships = memberships
        .into_iter()
        .filter(|m| active.contains(&m.store_id));

    let (role, store_ids_accessible) = {
        let (owned, staffed): (Vec<_>, Vec<_>) =
            active_memberships.partition(|m| m.role == MemberRole::Owner);
        if !owned.is_empty() {
            (
                MemberRole::Owner,
                owned.into_iter().map(|m| m.store_id).collect::<Vec<_>>(),
            )
        } else if let Some(first) = staffed.into_iter().next() {
            (MemberRole::Staff, vec![first.store_id])
        } else {
            tracing::warn!(user_id = %user.user_id, "caller has no active store membership");
            return Err(AppError::Forbidden);
        }
    };

    let store_id = match selected {
        Some(id) if store_ids_accessible.contains(&id) => id,
        Some(id) => {
            tracing::warn!(user_id = %user.user_id, requested = %id, "store selection rejected");
            return Err(AppError::Forbidden);
        }
        None => store_ids_accessible[0],
    };

    Ok(TenantContext {
        user_id: user.user_id,
        store_id,
        role,
        store_ids_accessible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: MemberRole, store_id: Uuid, stores: Vec<Uuid>) -> TenantContext {
        TenantContext {
            user_id: Uuid::new_v4(),
            store_id,
            role,
            store_ids_accessible: stores,
        }
    }

    #[test]
    fn staff_are_never_owners() {
        let store = Uuid::new_v4();
        let ctx = context(MemberRole::Staff, store, vec![store]);
        assert!(!ctx.is_owner_of(store));
        assert!(matches!(ctx.ensure_owner(), Err(AppError::Forbidden)));
    }

    #[test]
    fn rows_from_other_stores_are_forbidden() {
        let store = Uuid::new_v4();
        let ctx = context(MemberRole::Owner, store, vec![store]);
        assert!(ctx.ensure_store(store).is_ok());
        assert!(matches!(
            ctx.ensure_store(Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }
}
