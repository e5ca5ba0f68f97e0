// ── Domain model for the resource tree ──

pub mod node;

pub use node::{
    AccountNode, ClusterNode, ConsumerNode, Expandability, NodeHeader, NodeKind, StreamNode,
    TreeNode, account_node_id, cluster_node_id, consumer_node_id, stream_node_id,
};
