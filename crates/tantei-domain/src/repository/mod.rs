//! Storage Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define WHAT the repository needs from storage,
//! but NOT how it's actually done. That's the adapter's job.
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────
//! trait AgentStore      │  MongoAgentStore
//!   fn find()           │  InMemoryAgentStore
//! trait UserStore       │  MongoUserStore
//!   fn find_following() │  InMemoryUserStore
//! ```

pub mod agent_store;
pub mod user_store;
