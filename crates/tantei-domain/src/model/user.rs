//! User - Opaque pass-through entity
//!
//! Only the follow-list is interpreted here. Everything else a user
//! document carries is kept verbatim in `attributes`, and follow-list
//! entries that do not name an agent are kept verbatim too.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of a user's follow-list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFollow {
    /// Account identifier of the followed agent
    pub agent: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl AgentFollow {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            details: Map::new(),
        }
    }
}

/// A follow-list entry, parsed when it has a string `agent` and kept as-is otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FollowEntry {
    Agent(AgentFollow),
    Other(Value),
}

impl FollowEntry {
    /// Account identifier of the followed agent, if this entry names one
    pub fn agent(&self) -> Option<&str> {
        match self {
            FollowEntry::Agent(follow) => Some(follow.agent.as_str()),
            FollowEntry::Other(_) => None,
        }
    }
}

impl From<Value> for FollowEntry {
    fn from(value: Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(follow) => FollowEntry::Agent(follow),
            Err(_) => FollowEntry::Other(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "agents", default, deserialize_with = "follow_list")]
    pub follows: Vec<FollowEntry>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            follows: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Builder: follow an agent by account identifier
    pub fn following(mut self, account_id: impl Into<String>) -> Self {
        self.follows.push(FollowEntry::Agent(AgentFollow::new(account_id)));
        self
    }

    /// Builder: attach an opaque attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn follows_agent(&self, account_id: &str) -> bool {
        self.follows.iter().any(|f| f.agent() == Some(account_id))
    }
}

/// `null` reads as an empty list and a lone value as a one-entry list
fn follow_list<'de, D>(deserializer: D) -> Result<Vec<FollowEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries.into_iter().map(FollowEntry::from).collect(),
        Some(single) => vec![FollowEntry::from(single)],
    })
}
