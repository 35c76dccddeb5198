//! MongoDB Store Implementations
//!
//! Documents are mapped with bson's serde support. Reads are lenient so
//! documents written by other services (integer fees, string timestamps,
//! `null` or missing optional fields) still load.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::error::ErrorKind as MongoErrorKind;
use mongodb::{Client, Collection, Database};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use tantei_domain::model::agent::{AgentDraft, AgentId, AgentPatch, AgentRecord, RiskLevel};
use tantei_domain::model::user::User;
use tantei_domain::repository::agent_store::{AgentFilter, AgentStore, StoreError};
use tantei_domain::repository::user_store::UserStore;

const ID: &str = "_id";
const OWNER: &str = "owner_wallet_address";
const ADDRESS: &str = "address";
const TIME_CREATED: &str = "time_created";
const FOLLOWS: &str = "agents";
const FOLLOWED_AGENT: &str = "agent";

/// Connection settings for the MongoDB stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub agents_collection: String,
    pub users_collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "tantei".to_string(),
            agents_collection: "agents".to_string(),
            users_collection: "users".to_string(),
        }
    }
}

impl MongoConfig {
    /// Open a client and return both stores over the configured collections
    pub async fn connect(&self) -> Result<(MongoAgentStore, MongoUserStore), StoreError> {
        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(store_error)?;
        let db = client.database(&self.database);
        debug!(database = %self.database, "connected to MongoDB");

        Ok((
            MongoAgentStore::new(&db, &self.agents_collection),
            MongoUserStore::new(&db, &self.users_collection),
        ))
    }
}

/// MongoDB Agent Store
#[derive(Debug, Clone)]
pub struct MongoAgentStore {
    collection: Collection<Document>,
}

impl MongoAgentStore {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl AgentStore for MongoAgentStore {
    async fn insert(&self, draft: &AgentDraft) -> Result<AgentId, StoreError> {
        let result = self
            .collection
            .insert_one(draft_to_document(draft)?)
            .await
            .map_err(store_error)?;

        match result.inserted_id {
            Bson::ObjectId(oid) => object_id_to_agent_id(&oid),
            other => Err(StoreError::decode(format!(
                "unexpected inserted id: {}",
                other
            ))),
        }
    }

    async fn find(&self, filter: &AgentFilter) -> Result<Vec<AgentRecord>, StoreError> {
        let cursor = self
            .collection
            .find(filter_document(filter)?)
            .await
            .map_err(store_error)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(store_error)?;
        docs.into_iter()
            .filter_map(|doc| document_to_record(doc).transpose())
            .collect()
    }

    async fn find_one(&self, filter: &AgentFilter) -> Result<Option<AgentRecord>, StoreError> {
        let found = self
            .collection
            .find_one(filter_document(filter)?)
            .await
            .map_err(store_error)?;
        Ok(found.map(document_to_record).transpose()?.flatten())
    }

    async fn update_one(&self, id: &AgentId, patch: &AgentPatch) -> Result<u64, StoreError> {
        let set = patch_document(patch)?;
        if set.is_empty() {
            return Ok(0);
        }

        let oid = agent_id_to_object_id(id)?;
        let result = self
            .collection
            .update_one(doc! { ID: oid }, doc! { "$set": set })
            .await
            .map_err(store_error)?;
        Ok(result.modified_count)
    }

    async fn delete_one(&self, id: &AgentId) -> Result<u64, StoreError> {
        let oid = agent_id_to_object_id(id)?;
        let result = self
            .collection
            .delete_one(doc! { ID: oid })
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count)
    }
}

/// MongoDB User Store
#[derive(Debug, Clone)]
pub struct MongoUserStore {
    collection: Collection<Document>,
}

impl MongoUserStore {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_following(&self, agent_account_id: &str) -> Result<Vec<User>, StoreError> {
        let cursor = self
            .collection
            .find(following_filter(agent_account_id))
            .await
            .map_err(store_error)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(store_error)?;
        docs.into_iter().map(document_to_user).collect()
    }
}

fn store_error(err: mongodb::error::Error) -> StoreError {
    match *err.kind {
        MongoErrorKind::ServerSelection { .. } | MongoErrorKind::Io(_) => {
            StoreError::unavailable(err.to_string())
        }
        _ => StoreError::query(err.to_string()),
    }
}

fn agent_id_to_object_id(id: &AgentId) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id.as_str()).map_err(|e| StoreError::query(e.to_string()))
}

fn object_id_to_agent_id(oid: &ObjectId) -> Result<AgentId, StoreError> {
    AgentId::parse(oid.to_hex()).map_err(|e| StoreError::decode(e.to_string()))
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn filter_document(filter: &AgentFilter) -> Result<Document, StoreError> {
    Ok(match filter {
        AgentFilter::All => Document::new(),
        AgentFilter::Id(id) => {
            let oid = agent_id_to_object_id(id)?;
            doc! { ID: oid }
        }
        AgentFilter::Owner(owner) => doc! { OWNER: owner.as_str() },
        AgentFilter::Account(account) => doc! { ADDRESS: account.as_str() },
        AgentFilter::Accounts(accounts) => doc! { ADDRESS: { "$in": accounts.clone() } },
    })
}

fn following_filter(agent_account_id: &str) -> Document {
    let path = format!("{}.{}", FOLLOWS, FOLLOWED_AGENT);
    doc! { path: agent_account_id }
}

fn draft_to_document(draft: &AgentDraft) -> Result<Document, StoreError> {
    let mut doc = bson::to_document(draft).map_err(|e| StoreError::query(e.to_string()))?;
    stamp_time_created(&mut doc, draft.time_created);
    Ok(doc)
}

/// `$set` body for a patch; `None` fields are skipped by serde
fn patch_document(patch: &AgentPatch) -> Result<Document, StoreError> {
    let mut set = bson::to_document(patch).map_err(|e| StoreError::query(e.to_string()))?;
    stamp_time_created(&mut set, patch.time_created);
    Ok(set)
}

/// Store timestamps as BSON dates rather than chrono's RFC 3339 strings
fn stamp_time_created(doc: &mut Document, at: Option<DateTime<Utc>>) {
    if let Some(at) = at {
        doc.insert(TIME_CREATED, to_bson_datetime(at));
    }
}

/// Read shape of an agent document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredAgent {
    #[serde(deserialize_with = "or_default")]
    owner_wallet_address: String,
    #[serde(deserialize_with = "or_default")]
    address: String,
    #[serde(deserialize_with = "or_default")]
    agent_name: String,
    #[serde(deserialize_with = "or_default")]
    strategy_type: String,
    #[serde(deserialize_with = "or_default")]
    strategy_description: String,
    #[serde(deserialize_with = "lenient_risk_level")]
    risk_level: RiskLevel,
    #[serde(deserialize_with = "or_default")]
    subscription_fee: f64,
    roi: Option<f64>,
    #[serde(deserialize_with = "stored_datetime")]
    time_created: Option<DateTime<Utc>>,
}

impl From<StoredAgent> for AgentDraft {
    fn from(stored: StoredAgent) -> Self {
        AgentDraft {
            owner_wallet_address: stored.owner_wallet_address,
            account_id: stored.address,
            agent_name: stored.agent_name,
            strategy_type: stored.strategy_type,
            strategy_description: stored.strategy_description,
            risk_level: stored.risk_level,
            subscription_fee: stored.subscription_fee,
            roi: stored.roi,
            time_created: stored.time_created,
        }
    }
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_risk_level<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(RiskLevel::default());
    };
    Ok(raw.parse().unwrap_or_else(|_| {
        warn!(risk_level = %raw, "unknown risk level, reading as moderate");
        RiskLevel::default()
    }))
}

/// Accepts a BSON date or an RFC 3339 string
fn stored_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Bson>::deserialize(deserializer)? {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::DateTime(dt)) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map(Some)
            .ok_or_else(|| D::Error::custom("date out of range")),
        Some(Bson::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!(
            "expected date, found {:?}",
            other.element_type()
        ))),
    }
}

/// `Ok(None)` for documents whose `_id` is not an ObjectId; they cannot be
/// addressed by [`AgentId`] and are skipped
fn document_to_record(doc: Document) -> Result<Option<AgentRecord>, StoreError> {
    let id = match doc.get(ID) {
        Some(Bson::ObjectId(oid)) => object_id_to_agent_id(oid)?,
        other => {
            warn!(id = ?other, "skipping agent document without an ObjectId _id");
            return Ok(None);
        }
    };

    let stored: StoredAgent =
        bson::from_document(doc).map_err(|e| StoreError::decode(format!("agent {}: {}", id, e)))?;
    Ok(Some(AgentRecord {
        id,
        draft: stored.into(),
    }))
}

fn document_to_user(mut doc: Document) -> Result<User, StoreError> {
    let id = doc
        .remove(ID)
        .map(bson_to_id_string)
        .ok_or_else(|| StoreError::decode(format!("user document without {}", ID)))?;
    doc.insert(ID, id);

    serde_json::from_value(Bson::Document(doc).into_relaxed_extjson())
        .map_err(|e| StoreError::decode(format!("user: {}", e)))
}

fn bson_to_id_string(value: Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.into_relaxed_extjson().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tantei_domain::model::user::FollowEntry;

    const OID: &str = "65f1c2a9b3d4e5f60718293a";

    fn oid() -> ObjectId {
        ObjectId::parse_str(OID).unwrap()
    }

    #[test]
    fn test_draft_to_document_omits_missing_optionals() {
        let draft = AgentDraft::new("0xabc", "0.0.1001", "Momentum Rider")
            .with_strategy("momentum", "Rides trends")
            .with_subscription_fee(10.0);

        let doc = draft_to_document(&draft).unwrap();
        assert_eq!(doc.get_str(ADDRESS).unwrap(), "0.0.1001");
        assert_eq!(doc.get_str("risk_level").unwrap(), "moderate");
        assert_eq!(doc.get_f64("subscription_fee").unwrap(), 10.0);
        assert!(!doc.contains_key(TIME_CREATED));
        assert!(!doc.contains_key("roi"));
        assert!(!doc.contains_key(ID));
    }

    #[test]
    fn test_timestamps_written_as_bson_dates() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let draft = AgentDraft::new("0xabc", "0.0.1001", "A").with_time_created(created);

        let mut doc = draft_to_document(&draft).unwrap();
        assert_eq!(doc.get_datetime(TIME_CREATED).unwrap(), &to_bson_datetime(created));

        doc.insert(ID, oid());
        let record = document_to_record(doc).unwrap().unwrap();
        assert_eq!(record.draft, draft);
    }

    #[test]
    fn test_document_to_record() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let doc = doc! {
            "_id": oid(),
            "owner_wallet_address": "0xabc",
            "address": "0.0.1001",
            "agent_name": "Momentum Rider",
            "strategy_type": "momentum",
            "risk_level": "high",
            "subscription_fee": 25_i32,
            "time_created": to_bson_datetime(created),
        };

        let record = document_to_record(doc).unwrap().unwrap();
        assert_eq!(record.id.as_str(), OID);
        assert_eq!(record.draft.risk_level, RiskLevel::High);
        assert_eq!(record.draft.subscription_fee, 25.0);
        assert_eq!(record.draft.strategy_description, "");
        assert_eq!(record.draft.time_created, Some(created));
        assert_eq!(record.draft.roi, None);
    }

    #[test]
    fn test_document_to_record_lenient_fields() {
        let doc = doc! {
            "_id": oid(),
            "owner_wallet_address": "0xabc",
            "address": "0.0.1001",
            "agent_name": "A",
            "strategy_type": Bson::Null,
            "risk_level": "extreme",
            "time_created": "2024-03-01T08:00:00Z",
        };

        let record = document_to_record(doc).unwrap().unwrap();
        assert_eq!(record.draft.strategy_type, "");
        assert_eq!(record.draft.risk_level, RiskLevel::Moderate);
        assert_eq!(record.draft.subscription_fee, 0.0);
        assert_eq!(
            record.draft.time_created,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_document_to_record_rejects_bad_types() {
        let bad_fee = doc! { "_id": oid(), "subscription_fee": "ten" };
        assert!(matches!(
            document_to_record(bad_fee),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn test_documents_without_object_id_are_skipped() {
        let legacy = doc! { "_id": "legacy-1", "address": "0.0.1" };
        assert_eq!(document_to_record(legacy).unwrap(), None);

        let missing_id = doc! { "address": "0.0.1" };
        assert_eq!(document_to_record(missing_id).unwrap(), None);
    }

    #[test]
    fn test_filter_documents() {
        let id = AgentId::parse(OID).unwrap();
        assert_eq!(filter_document(&AgentFilter::Id(id)).unwrap(), doc! { "_id": oid() });
        assert_eq!(filter_document(&AgentFilter::All).unwrap(), Document::new());
        assert_eq!(
            filter_document(&AgentFilter::Accounts(vec!["0.0.1".into(), "0.0.2".into()])).unwrap(),
            doc! { "address": { "$in": ["0.0.1", "0.0.2"] } }
        );
        assert_eq!(following_filter("0.0.1"), doc! { "agents.agent": "0.0.1" });
    }

    #[test]
    fn test_patch_document_sets_only_given_fields() {
        let patch = AgentPatch::new().risk_level(RiskLevel::High).roi(4.5);
        assert_eq!(
            patch_document(&patch).unwrap(),
            doc! { "risk_level": "high", "roi": 4.5 }
        );
        assert!(patch_document(&AgentPatch::new()).unwrap().is_empty());
    }

    #[test]
    fn test_document_to_user() {
        let doc = doc! {
            "_id": oid(),
            "wallet": "0xdef",
            "agents": [ { "agent": "0.0.1001", "amount": 25_i32 } ],
        };

        let user = document_to_user(doc).unwrap();
        assert_eq!(user.id, OID);
        assert!(user.follows_agent("0.0.1001"));
        assert!(matches!(&user.follows[0], FollowEntry::Agent(f) if f.details["amount"] == 25));
        assert_eq!(user.attributes["wallet"], "0xdef");
    }

    #[test]
    fn test_document_to_user_keeps_odd_follow_entries() {
        let doc = doc! {
            "_id": oid(),
            "agents": [ { "agent": "0.0.1001" }, "legacy-entry", { "agent": 42_i32 } ],
        };

        let user = document_to_user(doc).unwrap();
        assert_eq!(user.follows.len(), 3);
        assert!(user.follows_agent("0.0.1001"));
        assert_eq!(user.follows[1], FollowEntry::Other(serde_json::json!("legacy-entry")));
        assert_eq!(user.follows[2].agent(), None);
    }

    #[test]
    fn test_default_config() {
        let config: MongoConfig = serde_json::from_str(r#"{"uri":"mongodb://db:27017"}"#).unwrap();
        assert_eq!(config.uri, "mongodb://db:27017");
        assert_eq!(config.agents_collection, "agents");
        assert_eq!(config.users_collection, "users");
    }
}
