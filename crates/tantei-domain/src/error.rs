//! Error types surfaced by the agent repository
//!
//! One kind per operation family. Callers never see a raw [`StoreError`];
//! it travels only as the `source` of an [`AgentError`].

use thiserror::Error;

use crate::model::agent::InvalidAgentId;
use crate::repository::agent_store::StoreError;

/// Which operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PublishFailed,
    FetchUserAgentsFailed,
    FetchAgentsFailed,
    FetchAgentFailed,
    UpdateAgentFailed,
    DeleteAgentFailed,
    FetchUsersFailed,
}

impl ErrorKind {
    /// Default human-readable message for this kind
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::PublishFailed => "Could not publish agent",
            ErrorKind::FetchUserAgentsFailed => "Could not get user agents",
            ErrorKind::FetchAgentsFailed => "Could not get agents",
            ErrorKind::FetchAgentFailed => "Could not get agent",
            ErrorKind::UpdateAgentFailed => "Could not update agent",
            ErrorKind::DeleteAgentFailed => "Could not delete agent",
            ErrorKind::FetchUsersFailed => "Could not get users",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let tag = match self {
            ErrorKind::PublishFailed => "PublishFailed",
            ErrorKind::FetchUserAgentsFailed => "FetchUserAgentsFailed",
            ErrorKind::FetchAgentsFailed => "FetchAgentsFailed",
            ErrorKind::FetchAgentFailed => "FetchAgentFailed",
            ErrorKind::UpdateAgentFailed => "UpdateAgentFailed",
            ErrorKind::DeleteAgentFailed => "DeleteAgentFailed",
            ErrorKind::FetchUsersFailed => "FetchUsersFailed",
        };
        f.write_str(tag)
    }
}

/// Underlying cause of an [`AgentError`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidId(#[from] InvalidAgentId),
}

/// Repository error: a kind tag, a message, and an optional cause
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AgentError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Fault>,
}

impl AgentError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            source: None,
        }
    }

    pub fn with_source(kind: ErrorKind, source: impl Into<Fault>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
