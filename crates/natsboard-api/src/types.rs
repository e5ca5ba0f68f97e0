// Wire types for the control-plane REST API.
//
// These mirror the JSON the control plane emits. Anything JetStream
// returns as an open-ended object (stream config, stream state, raw
// account details) stays a `serde_json` map here -- the core crate
// decides how much structure to impose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a managed cluster or tenant account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Active,
    Disabled,
}

impl ResourceStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A managed messaging cluster, as returned by `GET /clusters/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: String,
    pub name: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub description: Option<String>,
}

/// A tenant account within a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub public_key: String,
    #[serde(default)]
    pub is_system_account: bool,
    pub status: ResourceStatus,
}

/// Aggregate JetStream usage for one account, from the cheap detection
/// endpoint. Only `streams` is load-bearing for expandability; the rest
/// is carried through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub streams: u64,
    #[serde(default)]
    pub consumers: u64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub accounts: u64,
    /// Raw per-account detail blobs as the server reports them.
    #[serde(default)]
    pub account_details: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

/// Full detail for a single stream: configuration and runtime state as
/// open key/value payloads, plus cluster-placement metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamDetail {
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
    #[serde(default)]
    pub state: serde_json::Map<String, Value>,
    #[serde(default)]
    pub cluster: Option<Value>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,
}

impl StreamDetail {
    /// The stream name embedded in the config payload, if present.
    pub fn name(&self) -> Option<&str> {
        self.config.get("name").and_then(Value::as_str)
    }
}

/// Consumer names attached to one stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumersResponse {
    #[serde(default)]
    pub consumers: Vec<String>,
}
