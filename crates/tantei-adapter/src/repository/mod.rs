//! Persistence Adapters - Storage port implementations
//!
//! These implement the store traits from tantei-domain.

pub mod in_memory;
pub mod mongo;
