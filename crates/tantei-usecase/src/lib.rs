//! # Tantei Use Case Layer
//!
//! Application-specific rules on top of the domain:
//!
//! - [`AgentRepository`]: the single entry point for reading and writing agents
//! - [`presenter`]: view models for agent cards and asset allocation

pub mod agent_repository;
pub mod presenter;

pub use agent_repository::AgentRepository;
pub use tantei_domain;
