//! Agent Store - Abstract persistence for Agents
//!
//! Find, insert, update and delete by filter. That's all the repository
//! needs from a document store.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::agent::{AgentDraft, AgentId, AgentPatch, AgentRecord};

/// Errors raised by a storage adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
    /// Store rejected or failed the operation
    #[error("Query failed: {message}")]
    Query { message: String },
    /// A stored document could not be mapped into a record
    #[error("Malformed document: {message}")]
    Decode { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        StoreError::Query {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode {
            message: message.into(),
        }
    }
}

/// Which agents a query selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentFilter {
    /// Every agent
    All,
    /// Exact match on the storage identifier
    Id(AgentId),
    /// Exact match on the owning wallet address
    Owner(String),
    /// Exact match on the on-chain account identifier
    Account(String),
    /// Account identifier is one of the given values
    Accounts(Vec<String>),
}

impl AgentFilter {
    /// Evaluate the filter against a record (for stores without a query engine)
    pub fn matches(&self, record: &AgentRecord) -> bool {
        match self {
            AgentFilter::All => true,
            AgentFilter::Id(id) => record.id == *id,
            AgentFilter::Owner(owner) => record.draft.owner_wallet_address == *owner,
            AgentFilter::Account(account) => record.draft.account_id == *account,
            AgentFilter::Accounts(accounts) => accounts.contains(&record.draft.account_id),
        }
    }
}

/// Agent Store Trait
///
/// This is a PORT in hexagonal architecture.
/// Adapters (in-memory, MongoDB) implement it; the repository consumes it.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Insert a new agent, returning the identifier the store assigned
    async fn insert(&self, draft: &AgentDraft) -> Result<AgentId, StoreError>;

    /// All agents matching the filter
    async fn find(&self, filter: &AgentFilter) -> Result<Vec<AgentRecord>, StoreError>;

    /// First agent matching the filter
    async fn find_one(&self, filter: &AgentFilter) -> Result<Option<AgentRecord>, StoreError>;

    /// Merge `patch` into the agent, returning how many documents changed (0 or 1)
    async fn update_one(&self, id: &AgentId, patch: &AgentPatch) -> Result<u64, StoreError>;

    /// Remove the agent, returning how many documents were deleted (0 or 1)
    async fn delete_one(&self, id: &AgentId) -> Result<u64, StoreError>;

    /// Look up a single agent by identifier
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        self.find_one(&AgentFilter::Id(id.clone())).await
    }
}
