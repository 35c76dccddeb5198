//! Agent Repository - Sole mediator between callers and persisted agents
//!
//! Every storage fault is logged here and re-raised as an [`AgentError`]
//! tagged with the failing operation. Missing records are not faults:
//! they come back as `None` / `false`.

use std::sync::Arc;

use tracing::{debug, error};

use tantei_domain::clock::{Clock, SystemClock};
use tantei_domain::error::{AgentError, ErrorKind, Fault, Result};
use tantei_domain::model::agent::{Agent, AgentDraft, AgentId, AgentPatch, AgentRecord};
use tantei_domain::model::user::User;
use tantei_domain::repository::agent_store::{AgentFilter, AgentStore};
use tantei_domain::repository::user_store::UserStore;

/// Repository over the agents and users collections
///
/// Holds only shared handles, so clones are cheap and can be moved
/// into concurrent tasks freely.
#[derive(Clone)]
pub struct AgentRepository {
    agents: Arc<dyn AgentStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl AgentRepository {
    pub fn new(agents: Arc<dyn AgentStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            agents,
            users,
            clock: Arc::new(SystemClock),
        }
    }

    /// Builder: replace the clock used to stamp records stored without `time_created`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add a new agent and return the identifier the store assigned
    pub async fn publish(&self, draft: AgentDraft) -> Result<AgentId> {
        debug!(account = %draft.account_id, owner = %draft.owner_wallet_address, "publishing agent");
        self.agents
            .insert(&draft)
            .await
            .map_err(|e| fail(ErrorKind::PublishFailed, e))
    }

    /// All agents owned by a wallet address
    pub async fn get_user_agents(&self, owner_wallet_address: &str) -> Result<Vec<Agent>> {
        let filter = AgentFilter::Owner(owner_wallet_address.to_string());
        self.find_many(&filter, ErrorKind::FetchUserAgentsFailed).await
    }

    pub async fn get_all_agents(&self) -> Result<Vec<Agent>> {
        self.find_many(&AgentFilter::All, ErrorKind::FetchAgentsFailed)
            .await
    }

    /// Look up by storage identifier; a malformed identifier is an error, not a miss
    pub async fn get_agent_by_id(&self, agent_id: &str) -> Result<Option<Agent>> {
        let id = parse_id(agent_id, ErrorKind::FetchAgentFailed)?;
        let found = self
            .agents
            .find_by_id(&id)
            .await
            .map_err(|e| fail(ErrorKind::FetchAgentFailed, e))?;
        Ok(found.map(|r| self.present(r)))
    }

    /// Look up by on-chain account identifier
    ///
    /// Without an identifier (or with an empty one) the store is not queried.
    pub async fn get_agent(&self, account_id: Option<&str>) -> Result<Option<Agent>> {
        let Some(account_id) = account_id.filter(|a| !a.is_empty()) else {
            return Ok(None);
        };

        let filter = AgentFilter::Account(account_id.to_string());
        let found = self
            .agents
            .find_one(&filter)
            .await
            .map_err(|e| fail(ErrorKind::FetchAgentFailed, e))?;
        Ok(found.map(|r| self.present(r)))
    }

    /// Agents for a set of account identifiers
    ///
    /// Identifiers with no matching agent are silently omitted.
    pub async fn get_agents(&self, accounts: Option<&[String]>) -> Result<Vec<Agent>> {
        let Some(accounts) = accounts else {
            return Ok(Vec::new());
        };

        let filter = AgentFilter::Accounts(accounts.to_vec());
        self.find_many(&filter, ErrorKind::FetchAgentsFailed).await
    }

    /// Merge `patch` into an agent; true iff at least one field changed
    pub async fn update_agent(&self, agent_id: &str, patch: AgentPatch) -> Result<bool> {
        let id = parse_id(agent_id, ErrorKind::UpdateAgentFailed)?;
        if patch.is_empty() {
            return Ok(false);
        }

        let modified = self
            .agents
            .update_one(&id, &patch)
            .await
            .map_err(|e| fail(ErrorKind::UpdateAgentFailed, e))?;
        Ok(modified > 0)
    }

    /// Remove an agent; true iff a record was removed
    ///
    /// Follow-lists referencing the agent are left as they are.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<bool> {
        let id = parse_id(agent_id, ErrorKind::DeleteAgentFailed)?;
        let deleted = self
            .agents
            .delete_one(&id)
            .await
            .map_err(|e| fail(ErrorKind::DeleteAgentFailed, e))?;
        Ok(deleted > 0)
    }

    /// Users whose follow-list names the given agent account identifier
    pub async fn get_users_following_agent(&self, agent_account_id: &str) -> Result<Vec<User>> {
        self.users
            .find_following(agent_account_id)
            .await
            .map_err(|e| fail(ErrorKind::FetchUsersFailed, e))
    }

    async fn find_many(&self, filter: &AgentFilter, kind: ErrorKind) -> Result<Vec<Agent>> {
        debug!(?filter, "querying agents");
        let records = self
            .agents
            .find(filter)
            .await
            .map_err(|e| fail(kind, e))?;
        Ok(records.into_iter().map(|r| self.present(r)).collect())
    }

    fn present(&self, record: AgentRecord) -> Agent {
        Agent::from_record(record, self.clock.now())
    }
}

fn parse_id(raw: &str, kind: ErrorKind) -> Result<AgentId> {
    AgentId::parse(raw).map_err(|e| fail(kind, e))
}

fn fail(kind: ErrorKind, fault: impl Into<Fault>) -> AgentError {
    let fault = fault.into();
    error!(%kind, error = %fault, "{}", kind.message());
    AgentError::with_source(kind, fault)
}
