// ── Resource-tree node model ──
//
// One tagged union over the four node variants with a shared header, so
// the dispatcher's per-type handling stays exhaustive under the compiler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use natsboard_api::{AccountSummary, ClusterSummary, DetectionResponse, ResourceStatus};

use crate::classify::ErrorInfo;

/// Whether an account node has streams worth expanding.
///
/// A deliberate three-value state: `Unknown` means "not yet probed" and
/// is first-class, not an optional boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expandability {
    #[default]
    Unknown,
    Expandable,
    NotExpandable,
}

/// The node type tag, for hosts that render by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Cluster,
    Account,
    Stream,
    Consumer,
}

/// Attributes shared by every node variant.
///
/// `children == None` means loading was never attempted; `Some(vec![])`
/// means attempted with zero results. The distinction drives the lazy
/// loader's "do I need to fetch" checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHeader {
    /// Stable identifier, globally unique across the tree.
    pub id: String,
    /// Display label for the host UI.
    pub label: String,
    pub children: Option<Vec<TreeNode>>,
    pub loading: bool,
    /// Last node-scoped failure; cleared when a retry begins.
    pub error: Option<ErrorInfo>,
}

impl NodeHeader {
    fn new(id: String, label: String) -> Self {
        Self {
            id,
            label,
            children: None,
            loading: false,
            error: None,
        }
    }
}

// ── Variants ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub header: NodeHeader,
    pub cluster_id: String,
    pub status: ResourceStatus,
    pub metadata: Option<ClusterSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    pub header: NodeHeader,
    pub account_id: String,
    pub public_key: String,
    pub is_system: bool,
    pub status: ResourceStatus,
    pub expandability: Expandability,
    pub jetstream_enabled: bool,
    /// Raw result of the last successful detection probe, kept both for
    /// display and as the supplementary source for the stream merge.
    pub detection: Option<DetectionResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamNode {
    pub header: NodeHeader,
    pub name: String,
    pub status: ResourceStatus,
    pub config: Option<Map<String, Value>>,
    pub state: Option<Map<String, Value>>,
    /// Cluster-placement metadata from the detail endpoint.
    pub placement: Option<Value>,
    pub created: Option<DateTime<Utc>>,
    pub ts: Option<DateTime<Utc>>,
}

impl StreamNode {
    /// A stream's detail payload is applied all-or-nothing, so either
    /// both maps are present or neither is.
    pub fn has_detail(&self) -> bool {
        self.config.is_some() && self.state.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerNode {
    pub header: NodeHeader,
    pub name: String,
    /// Name of the owning stream.
    pub stream_name: String,
    pub status: ResourceStatus,
}

// ── The union ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Cluster(ClusterNode),
    Account(AccountNode),
    Stream(StreamNode),
    Consumer(ConsumerNode),
}

impl TreeNode {
    pub fn header(&self) -> &NodeHeader {
        match self {
            Self::Cluster(n) => &n.header,
            Self::Account(n) => &n.header,
            Self::Stream(n) => &n.header,
            Self::Consumer(n) => &n.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut NodeHeader {
        match self {
            Self::Cluster(n) => &mut n.header,
            Self::Account(n) => &mut n.header,
            Self::Stream(n) => &mut n.header,
            Self::Consumer(n) => &mut n.header,
        }
    }

    pub fn id(&self) -> &str {
        &self.header().id
    }

    pub fn label(&self) -> &str {
        &self.header().label
    }

    pub fn children(&self) -> Option<&[TreeNode]> {
        self.header().children.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Cluster(_) => NodeKind::Cluster,
            Self::Account(_) => NodeKind::Account,
            Self::Stream(_) => NodeKind::Stream,
            Self::Consumer(_) => NodeKind::Consumer,
        }
    }

    pub fn as_account(&self) -> Option<&AccountNode> {
        match self {
            Self::Account(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_account_mut(&mut self) -> Option<&mut AccountNode> {
        match self {
            Self::Account(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&StreamNode> {
        match self {
            Self::Stream(n) => Some(n),
            _ => None,
        }
    }
}

// ── Derived identifiers ──────────────────────────────────────────────
//
// Ids encode lineage so they stay unique across the whole tree, and so
// caches keyed by derived ids survive node replacement.

pub fn cluster_node_id(cluster_id: &str) -> String {
    format!("cluster_{cluster_id}")
}

pub fn account_node_id(account_id: &str) -> String {
    format!("account_{account_id}")
}

pub fn stream_node_id(account_id: &str, stream_name: &str) -> String {
    format!("stream_{account_id}_{stream_name}")
}

pub fn consumer_node_id(stream_name: &str, consumer_name: &str) -> String {
    format!("consumer_{stream_name}_{consumer_name}")
}

// ── Constructors ─────────────────────────────────────────────────────

impl ClusterNode {
    /// Build the root node from whatever metadata is already known.
    /// Children start empty (not absent) -- account loading is lazy but
    /// the root itself is always present.
    pub fn new(cluster_id: &str, metadata: Option<ClusterSummary>) -> Self {
        let label = metadata
            .as_ref()
            .map_or_else(|| cluster_id.to_owned(), |m| m.name.clone());
        let status = metadata
            .as_ref()
            .map_or(ResourceStatus::Disabled, |m| m.status);
        let mut header = NodeHeader::new(cluster_node_id(cluster_id), label);
        header.children = Some(Vec::new());
        Self {
            header,
            cluster_id: cluster_id.to_owned(),
            status,
            metadata,
        }
    }
}

impl AccountNode {
    pub fn from_summary(summary: &AccountSummary) -> Self {
        Self {
            header: NodeHeader::new(account_node_id(&summary.id), summary.name.clone()),
            account_id: summary.id.clone(),
            public_key: summary.public_key.clone(),
            is_system: summary.is_system_account,
            status: summary.status,
            expandability: Expandability::Unknown,
            jetstream_enabled: false,
            detection: None,
        }
    }
}

impl StreamNode {
    /// A name-only stream node, before any detail has been fetched.
    pub fn named(account_id: &str, name: &str) -> Self {
        Self {
            header: NodeHeader::new(stream_node_id(account_id, name), name.to_owned()),
            name: name.to_owned(),
            status: ResourceStatus::Active,
            config: None,
            state: None,
            placement: None,
            created: None,
            ts: None,
        }
    }
}

impl ConsumerNode {
    pub fn new(stream_name: &str, name: &str) -> Self {
        Self {
            header: NodeHeader::new(consumer_node_id(stream_name, name), name.to_owned()),
            name: name.to_owned(),
            stream_name: stream_name.to_owned(),
            status: ResourceStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_root_starts_with_empty_children() {
        let node = ClusterNode::new("cl-1", None);
        assert_eq!(node.header.id, "cluster_cl-1");
        assert_eq!(node.header.children.as_deref(), Some(&[][..]));
    }

    #[test]
    fn cluster_label_prefers_metadata_name() {
        let meta = ClusterSummary {
            id: "cl-1".into(),
            name: "production".into(),
            status: ResourceStatus::Active,
            description: None,
        };
        let node = ClusterNode::new("cl-1", Some(meta));
        assert_eq!(node.header.label, "production");
        assert_eq!(node.status, ResourceStatus::Active);
    }

    #[test]
    fn account_node_starts_unprobed_and_unloaded() {
        let summary = AccountSummary {
            id: "ac-1".into(),
            name: "payments".into(),
            public_key: "AABBCC".into(),
            is_system_account: false,
            status: ResourceStatus::Active,
        };
        let node = AccountNode::from_summary(&summary);
        assert_eq!(node.expandability, Expandability::Unknown);
        assert!(node.header.children.is_none());
        assert!(!node.jetstream_enabled);
    }

    #[test]
    fn stream_ids_are_account_scoped() {
        let a = StreamNode::named("ac-1", "orders");
        let b = StreamNode::named("ac-2", "orders");
        assert_ne!(a.header.id, b.header.id);
    }
}
