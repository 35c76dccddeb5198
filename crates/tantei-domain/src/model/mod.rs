//! Domain Models - The vocabulary of Tantei
//!
//! Agents are published strategies; users follow them by account id.

pub mod agent;
pub mod token;
pub mod user;
