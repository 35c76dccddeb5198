//! Subcommands and the repository wiring behind them

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::info;

use tantei_adapter::{InMemoryAgentStore, InMemoryUserStore};
use tantei_domain::{AgentDraft, AgentPatch};
use tantei_usecase::presenter::AgentCardView;
use tantei_usecase::AgentRepository;

use crate::config::{read_json, AppConfig, Seed, StoreKind};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Publish an agent described by a JSON file
    Publish { file: PathBuf },
    /// List agents, optionally only those owned by a wallet
    List {
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show one agent by id
    Show { id: String },
    /// Find the agent registered for an account
    Lookup {
        #[arg(long)]
        account: Option<String>,
    },
    /// Find agents for several accounts
    LookupMany { accounts: Vec<String> },
    /// Apply a JSON patch file to an agent
    Update { id: String, patch: PathBuf },
    /// Delete an agent by id
    Delete { id: String },
    /// Users following an agent account
    Followers { account: String },
    /// Render an agent's card view model
    Card {
        id: String,
        #[arg(long)]
        compact: bool,
    },
}

/// Wire a repository over the configured backend
pub async fn build_repository(config: &AppConfig) -> anyhow::Result<AgentRepository> {
    match config.store {
        StoreKind::Memory => {
            let seed = match &config.seed {
                Some(path) => Seed::from_file(path)?,
                None => Seed::default(),
            };
            let agents = InMemoryAgentStore::new();
            let users = InMemoryUserStore::with_users(seed.users);
            let repo = AgentRepository::new(Arc::new(agents), Arc::new(users));

            let count = seed.agents.len();
            for draft in seed.agents {
                repo.publish(draft).await?;
            }
            info!(agents = count, "using in-memory store");
            Ok(repo)
        }
        StoreKind::Mongo => {
            let (agents, users) = config
                .mongo
                .connect()
                .await
                .context("connecting to MongoDB")?;
            info!(database = %config.mongo.database, "using MongoDB store");
            Ok(AgentRepository::new(Arc::new(agents), Arc::new(users)))
        }
    }
}

/// Run one command, returning its JSON output
pub async fn run(repo: &AgentRepository, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Publish { file } => {
            let draft: AgentDraft = read_json(&file)?;
            let id = repo.publish(draft).await?;
            json!({ "id": id })
        }
        Command::List { owner: Some(owner) } => json!(repo.get_user_agents(&owner).await?),
        Command::List { owner: None } => json!(repo.get_all_agents().await?),
        Command::Show { id } => json!(repo.get_agent_by_id(&id).await?),
        Command::Lookup { account } => json!(repo.get_agent(account.as_deref()).await?),
        Command::LookupMany { accounts } => {
            let accounts = (!accounts.is_empty()).then_some(accounts);
            json!(repo.get_agents(accounts.as_deref()).await?)
        }
        Command::Update { id, patch } => {
            let patch: AgentPatch = read_json(&patch)?;
            json!({ "modified": repo.update_agent(&id, patch).await? })
        }
        Command::Delete { id } => json!({ "deleted": repo.delete_agent(&id).await? }),
        Command::Followers { account } => {
            json!(repo.get_users_following_agent(&account).await?)
        }
        Command::Card { id, compact } => {
            let agent = repo
                .get_agent_by_id(&id)
                .await?
                .ok_or_else(|| anyhow!("agent {} not found", id))?;
            json!(AgentCardView::new(&agent, chrono::Utc::now(), compact))
        }
    };
    Ok(output)
}
