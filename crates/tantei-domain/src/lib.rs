//! # Tantei Domain Layer
//!
//! Agents, users, and the storage ports they are persisted through.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Entities & Value Objects                      ││
//! │  │  repository/- Storage ports (not implementations)           ││
//! │  │  error      - Failure taxonomy surfaced to callers          ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No drivers, no runtime. If we switch from MongoDB to something else,
//! this crate doesn't change.

pub mod clock;
pub mod error;
pub mod model;
pub mod repository;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AgentError, ErrorKind, Fault};
pub use model::{
    agent::{Agent, AgentDraft, AgentId, AgentPatch, AgentRecord, InvalidAgentId, RiskLevel},
    token::TokenBalance,
    user::{AgentFollow, FollowEntry, User},
};
pub use repository::{
    agent_store::{AgentFilter, AgentStore, StoreError},
    user_store::UserStore,
};
