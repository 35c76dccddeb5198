//! In-Memory Store Implementations
//!
//! Simple in-memory implementations of the storage ports.
//! Useful for testing and development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use tantei_domain::model::agent::{AgentDraft, AgentId, AgentPatch, AgentRecord};
use tantei_domain::model::user::User;
use tantei_domain::repository::agent_store::{AgentFilter, AgentStore, StoreError};
use tantei_domain::repository::user_store::UserStore;

/// In-memory Agent Store
///
/// Thread-safe implementation using RwLock. Records keep insertion order.
/// Can be taken offline to simulate an unreachable store.
#[derive(Debug, Clone)]
pub struct InMemoryAgentStore {
    agents: Arc<RwLock<Vec<AgentRecord>>>,
    online: Arc<AtomicBool>,
}

impl Default for InMemoryAgentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(Vec::new())),
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the store going down (`false`) or coming back (`true`)
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Raw stored records, bypassing read-time normalization
    pub fn records(&self) -> Result<Vec<AgentRecord>, StoreError> {
        let agents = self.read()?;
        Ok(agents.clone())
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("in-memory store is offline"))
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<AgentRecord>>, StoreError> {
        self.ensure_online()?;
        self.agents
            .read()
            .map_err(|_| StoreError::query("Failed to acquire read lock"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<AgentRecord>>, StoreError> {
        self.ensure_online()?;
        self.agents
            .write()
            .map_err(|_| StoreError::query("Failed to acquire write lock"))
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn insert(&self, draft: &AgentDraft) -> Result<AgentId, StoreError> {
        let id = AgentId::parse(ObjectId::new().to_hex())
            .map_err(|e| StoreError::query(e.to_string()))?;

        let mut agents = self.write()?;
        agents.push(AgentRecord {
            id: id.clone(),
            draft: draft.clone(),
        });
        Ok(id)
    }

    async fn find(&self, filter: &AgentFilter) -> Result<Vec<AgentRecord>, StoreError> {
        let agents = self.read()?;
        Ok(agents
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn find_one(&self, filter: &AgentFilter) -> Result<Option<AgentRecord>, StoreError> {
        let agents = self.read()?;
        Ok(agents.iter().find(|r| filter.matches(r)).cloned())
    }

    async fn update_one(&self, id: &AgentId, patch: &AgentPatch) -> Result<u64, StoreError> {
        let mut agents = self.write()?;
        let modified = agents
            .iter_mut()
            .find(|r| r.id == *id)
            .map(|r| patch.apply(&mut r.draft))
            .unwrap_or(false);
        Ok(u64::from(modified))
    }

    async fn delete_one(&self, id: &AgentId) -> Result<u64, StoreError> {
        let mut agents = self.write()?;
        match agents.iter().position(|r| r.id == *id) {
            Some(index) => {
                agents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

/// In-memory User Store
///
/// Can be taken offline like [`InMemoryAgentStore`].
#[derive(Debug, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
    online: Arc<AtomicBool>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users.into_iter().collect())),
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the store going down (`false`) or coming back (`true`)
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn add(&self, user: User) -> Result<(), StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::query("Failed to acquire write lock"))?;
        users.push(user);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_following(&self, agent_account_id: &str) -> Result<Vec<User>, StoreError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store is offline"));
        }
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::query("Failed to acquire read lock"))?;
        Ok(users
            .iter()
            .filter(|u| u.follows_agent(agent_account_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tantei_domain::model::agent::RiskLevel;

    fn draft(owner: &str, account: &str) -> AgentDraft {
        AgentDraft::new(owner, account, "Test Agent").with_strategy("mean-reversion", "")
    }

    #[tokio::test]
    async fn test_agent_store() {
        let store = InMemoryAgentStore::new();

        let a = store.insert(&draft("0xabc", "0.0.1")).await.unwrap();
        let b = store.insert(&draft("0xabc", "0.0.2")).await.unwrap();
        store.insert(&draft("0xdef", "0.0.3")).await.unwrap();
        assert_ne!(a, b);

        let owned = store.find(&AgentFilter::Owner("0xabc".into())).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].id, a);

        let found = store.find_by_id(&b).await.unwrap().unwrap();
        assert_eq!(found.draft.account_id, "0.0.2");
    }

    #[tokio::test]
    async fn test_update_counts_only_real_changes() {
        let store = InMemoryAgentStore::new();
        let id = store.insert(&draft("0xabc", "0.0.1")).await.unwrap();

        let patch = AgentPatch::new().risk_level(RiskLevel::High);
        assert_eq!(store.update_one(&id, &patch).await.unwrap(), 1);
        assert_eq!(store.update_one(&id, &patch).await.unwrap(), 0);

        let missing = AgentId::parse("0123456789abcdef01234567").unwrap();
        assert_eq!(store.update_one(&missing, &patch).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryAgentStore::new();
        let id = store.insert(&draft("0xabc", "0.0.1")).await.unwrap();

        assert_eq!(store.delete_one(&id).await.unwrap(), 1);
        assert_eq!(store.delete_one(&id).await.unwrap(), 0);
        assert!(store.records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = InMemoryAgentStore::new();
        store.set_online(false);

        let err = store.find(&AgentFilter::All).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));

        store.set_online(true);
        assert!(store.find(&AgentFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_store() {
        let store = InMemoryUserStore::with_users(vec![
            User::new("u-1").following("0.0.1"),
            User::new("u-2"),
        ]);
        store.add(User::new("u-3").following("0.0.1")).unwrap();

        let followers = store.find_following("0.0.1").await.unwrap();
        assert_eq!(followers.len(), 2);
        assert!(store.find_following("0.0.9").await.unwrap().is_empty());

        store.set_online(false);
        let err = store.find_following("0.0.1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
