//! User Store - Read-only access to users for follower lookups

use async_trait::async_trait;

use crate::model::user::User;
use crate::repository::agent_store::StoreError;

/// User Store Trait
///
/// This is a PORT in hexagonal architecture.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Users whose follow-list contains the given agent account identifier
    async fn find_following(&self, agent_account_id: &str) -> Result<Vec<User>, StoreError>;
}
