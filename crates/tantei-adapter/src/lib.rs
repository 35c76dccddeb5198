//! # Tantei Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `repository/` - Storage port implementations (in-memory, MongoDB)

pub mod repository;

pub use repository::in_memory::{InMemoryAgentStore, InMemoryUserStore};
pub use repository::mongo::{MongoAgentStore, MongoConfig, MongoUserStore};
