//! Agent - A published trading strategy
//!
//! Three shapes of the same thing:
//!
//! - [`AgentDraft`]: what a publisher submits (no identity yet)
//! - [`AgentRecord`]: what the store holds (identity + draft, timestamp optional)
//! - [`Agent`]: what callers read (timestamp always present)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid agent id '{value}': expected 24 hexadecimal characters")]
pub struct InvalidAgentId {
    pub value: String,
}

/// Unique identifier for an Agent
///
/// Always the 24-digit lowercase hex form of a store-generated document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    pub const LEN: usize = 24;

    /// Parse an identifier, rejecting anything that is not 24 hex digits
    pub fn parse(value: impl AsRef<str>) -> Result<Self, InvalidAgentId> {
        let value = value.as_ref();
        if value.len() == Self::LEN && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(InvalidAgentId {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for AgentId {
    type Err = InvalidAgentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AgentId {
    type Error = InvalidAgentId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// How much risk a strategy takes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    /// Capitalized form for display
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl core::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// An agent as submitted for publishing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDraft {
    pub owner_wallet_address: String,
    /// On-chain account identifier (persisted as `address`)
    #[serde(rename = "address")]
    pub account_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub strategy_type: String,
    #[serde(default)]
    pub strategy_description: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub subscription_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
}

impl AgentDraft {
    pub fn new(
        owner_wallet_address: impl Into<String>,
        account_id: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            owner_wallet_address: owner_wallet_address.into(),
            account_id: account_id.into(),
            agent_name: agent_name.into(),
            strategy_type: String::new(),
            strategy_description: String::new(),
            risk_level: RiskLevel::default(),
            subscription_fee: 0.0,
            roi: None,
            time_created: None,
        }
    }

    pub fn with_strategy(
        mut self,
        strategy_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.strategy_type = strategy_type.into();
        self.strategy_description = description.into();
        self
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_subscription_fee(mut self, fee: f64) -> Self {
        self.subscription_fee = fee;
        self
    }

    pub fn with_roi(mut self, roi: f64) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn with_time_created(mut self, at: DateTime<Utc>) -> Self {
        self.time_created = Some(at);
        self
    }
}

/// An agent as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    pub id: AgentId,
    pub draft: AgentDraft,
}

/// An agent as returned to callers
///
/// Unlike [`AgentRecord`], `time_created` is always present. Records stored
/// without one are stamped with the read time; the store is not updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "_id")]
    pub id: AgentId,
    pub owner_wallet_address: String,
    #[serde(rename = "address")]
    pub account_id: String,
    pub agent_name: String,
    pub strategy_type: String,
    pub strategy_description: String,
    pub risk_level: RiskLevel,
    pub subscription_fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
    pub time_created: DateTime<Utc>,
}

impl Agent {
    pub fn from_record(record: AgentRecord, now: DateTime<Utc>) -> Self {
        let AgentRecord { id, draft } = record;
        Self {
            id,
            owner_wallet_address: draft.owner_wallet_address,
            account_id: draft.account_id,
            agent_name: draft.agent_name,
            strategy_type: draft.strategy_type,
            strategy_description: draft.strategy_description,
            risk_level: draft.risk_level,
            subscription_fee: draft.subscription_fee,
            roi: draft.roi,
            time_created: draft.time_created.unwrap_or(now),
        }
    }
}

/// Partial update: `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_wallet_address: Option<String>,
    #[serde(rename = "address", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
}

impl AgentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn strategy_type(mut self, strategy_type: impl Into<String>) -> Self {
        self.strategy_type = Some(strategy_type.into());
        self
    }

    pub fn strategy_description(mut self, description: impl Into<String>) -> Self {
        self.strategy_description = Some(description.into());
        self
    }

    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = Some(risk_level);
        self
    }

    pub fn subscription_fee(mut self, fee: f64) -> Self {
        self.subscription_fee = Some(fee);
        self
    }

    pub fn roi(mut self, roi: f64) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `draft`, returning whether any field actually changed
    pub fn apply(&self, draft: &mut AgentDraft) -> bool {
        let mut changed = false;
        changed |= set_if_changed(&mut draft.owner_wallet_address, &self.owner_wallet_address);
        changed |= set_if_changed(&mut draft.account_id, &self.account_id);
        changed |= set_if_changed(&mut draft.agent_name, &self.agent_name);
        changed |= set_if_changed(&mut draft.strategy_type, &self.strategy_type);
        changed |= set_if_changed(&mut draft.strategy_description, &self.strategy_description);
        changed |= set_if_changed(&mut draft.risk_level, &self.risk_level);
        changed |= set_if_changed(&mut draft.subscription_fee, &self.subscription_fee);
        if let Some(roi) = self.roi {
            if draft.roi != Some(roi) {
                draft.roi = Some(roi);
                changed = true;
            }
        }
        if let Some(at) = self.time_created {
            if draft.time_created != Some(at) {
                draft.time_created = Some(at);
                changed = true;
            }
        }
        changed
    }
}

fn set_if_changed<T: PartialEq + Clone>(slot: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(v) if slot != v => {
            *slot = v.clone();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> AgentDraft {
        AgentDraft::new("0xabc", "0.0.1001", "Momentum Rider")
            .with_strategy("momentum", "Buys strength")
            .with_subscription_fee(10.0)
    }

    #[test]
    fn test_agent_id_parse() {
        let id = AgentId::parse("65F1C2A9B3D4E5F60718293A").unwrap();
        assert_eq!(id.as_str(), "65f1c2a9b3d4e5f60718293a");

        assert!(AgentId::parse("not-an-id").is_err());
        assert!(AgentId::parse("").is_err());
        assert!(AgentId::parse("65f1c2a9b3d4e5f60718293").is_err());
        assert!(AgentId::parse("65f1c2a9b3d4e5f60718293z").is_err());
    }

    #[test]
    fn test_agent_id_deserialize_rejects_malformed() {
        let ok: Result<AgentId, _> = serde_json::from_str("\"65f1c2a9b3d4e5f60718293a\"");
        assert!(ok.is_ok());

        let bad: Result<AgentId, _> = serde_json::from_str("\"xyz\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_risk_level_defaults_to_moderate() {
        let json = r#"{"owner_wallet_address":"0xabc","address":"0.0.1","agent_name":"A"}"#;
        let draft: AgentDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.risk_level, RiskLevel::Moderate);
        assert_eq!(draft.time_created, None);
    }

    #[test]
    fn test_from_record_synthesizes_missing_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = AgentRecord {
            id: AgentId::parse("65f1c2a9b3d4e5f60718293a").unwrap(),
            draft: draft(),
        };

        let agent = Agent::from_record(record, now);
        assert_eq!(agent.time_created, now);
        assert_eq!(agent.account_id, "0.0.1001");
    }

    #[test]
    fn test_from_record_keeps_stored_timestamp() {
        let stored = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = AgentRecord {
            id: AgentId::parse("65f1c2a9b3d4e5f60718293a").unwrap(),
            draft: draft().with_time_created(stored),
        };

        assert_eq!(Agent::from_record(record, now).time_created, stored);
    }

    #[test]
    fn test_patch_apply_reports_changes() {
        let mut target = draft();

        let patch = AgentPatch::new().risk_level(RiskLevel::High);
        assert!(patch.apply(&mut target));
        assert_eq!(target.risk_level, RiskLevel::High);
        assert_eq!(target.strategy_type, "momentum");

        // Same value again is not a modification
        assert!(!patch.apply(&mut target));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(AgentPatch::new().is_empty());
        assert!(!AgentPatch::new().roi(1.5).is_empty());

        let parsed: AgentPatch = serde_json::from_str(r#"{"risk_level":"high"}"#).unwrap();
        assert_eq!(parsed.risk_level, Some(RiskLevel::High));
        assert!(parsed.agent_name.is_none());
    }

    #[test]
    fn test_agent_serializes_store_field_names() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let agent = Agent::from_record(
            AgentRecord {
                id: AgentId::parse("65f1c2a9b3d4e5f60718293a").unwrap(),
                draft: draft(),
            },
            now,
        );

        let value = serde_json::to_value(&agent).unwrap();
        assert_eq!(value["_id"], "65f1c2a9b3d4e5f60718293a");
        assert_eq!(value["address"], "0.0.1001");
        assert_eq!(value["risk_level"], "moderate");
        assert!(value.get("roi").is_none());
    }
}
