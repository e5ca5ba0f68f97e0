// ── Tree store ──
//
// Owns the node graph: one cluster root with lazily loaded levels below.
// The store is the single writer; the loader computes full replacement
// sets before mutating, so every write here is a flat, synchronous
// replacement with no torn-read hazard.

use natsboard_api::{AccountSummary, ClusterSummary};

use crate::model::{AccountNode, ClusterNode, TreeNode};

/// The node graph for one cluster.
#[derive(Debug, Default)]
pub struct TreeStore {
    root: Option<TreeNode>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the root cluster node from already-known metadata. Children
    /// start empty (not absent); accounts load on first selection.
    pub fn initialize_root(&mut self, cluster_id: &str, metadata: Option<ClusterSummary>) {
        self.root = Some(TreeNode::Cluster(ClusterNode::new(cluster_id, metadata)));
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Replace the root's children with one Account node per non-system
    /// summary. System accounts are an administrative concern and never
    /// appear in the tree.
    pub fn load_accounts(&mut self, accounts: &[AccountSummary]) -> usize {
        let children: Vec<TreeNode> = accounts
            .iter()
            .filter(|a| !a.is_system_account)
            .map(|a| TreeNode::Account(AccountNode::from_summary(a)))
            .collect();
        let count = children.len();

        if let Some(root) = self.root.as_mut() {
            root.header_mut().children = Some(children);
        }
        count
    }

    /// Depth-first lookup. Tree depth is bounded at four levels, so this
    /// is linear in node count.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.root.as_ref().and_then(|root| find_in(root, id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        self.root.as_mut().and_then(|root| find_in_mut(root, id))
    }

    /// The Account node whose children contain `id`. Used for cache
    /// invalidation by lineage when refreshing a stream.
    pub fn parent_account_of(&self, id: &str) -> Option<&AccountNode> {
        self.account_nodes()
            .into_iter()
            .find(|account| {
                account
                    .header
                    .children
                    .as_ref()
                    .is_some_and(|children| children.iter().any(|c| c.id() == id))
            })
    }

    /// Atomic flat replacement of a node's children. Returns `false` if
    /// the node no longer exists (late results are dropped silently).
    pub fn replace_children(&mut self, id: &str, children: Vec<TreeNode>) -> bool {
        match self.find_mut(id) {
            Some(node) => {
                node.header_mut().children = Some(children);
                true
            }
            None => false,
        }
    }

    /// All Account nodes directly under the root.
    pub fn account_nodes(&self) -> Vec<&AccountNode> {
        self.root
            .as_ref()
            .and_then(TreeNode::children)
            .map(|children| children.iter().filter_map(TreeNode::as_account).collect())
            .unwrap_or_default()
    }
}

fn find_in<'a>(node: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    if node.id() == id {
        return Some(node);
    }
    node.children()?
        .iter()
        .find_map(|child| find_in(child, id))
}

fn find_in_mut<'a>(node: &'a mut TreeNode, id: &str) -> Option<&'a mut TreeNode> {
    if node.id() == id {
        return Some(node);
    }
    node.header_mut()
        .children
        .as_mut()?
        .iter_mut()
        .find_map(|child| find_in_mut(child, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expandability, StreamNode, account_node_id, stream_node_id};
    use natsboard_api::ResourceStatus;

    fn summary(id: &str, name: &str, system: bool) -> AccountSummary {
        AccountSummary {
            id: id.into(),
            name: name.into(),
            public_key: format!("K{id}"),
            is_system_account: system,
            status: ResourceStatus::Active,
        }
    }

    fn store_with_accounts() -> TreeStore {
        let mut store = TreeStore::new();
        store.initialize_root("cl-1", None);
        store.load_accounts(&[
            summary("ac-1", "payments", false),
            summary("ac-sys", "SYS", true),
            summary("ac-2", "billing", false),
        ]);
        store
    }

    #[test]
    fn load_accounts_excludes_system_accounts() {
        let store = store_with_accounts();
        let accounts = store.account_nodes();
        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(|a| !a.is_system));
    }

    #[test]
    fn new_account_nodes_start_unknown_and_unloaded() {
        let store = store_with_accounts();
        for account in store.account_nodes() {
            assert_eq!(account.expandability, Expandability::Unknown);
            assert!(account.header.children.is_none());
        }
    }

    #[test]
    fn find_reaches_all_levels() {
        let mut store = store_with_accounts();
        let account_id = account_node_id("ac-1");
        store.replace_children(
            &account_id,
            vec![TreeNode::Stream(StreamNode::named("ac-1", "orders"))],
        );

        assert!(store.find("cluster_cl-1").is_some());
        assert!(store.find(&account_id).is_some());
        assert!(store.find(&stream_node_id("ac-1", "orders")).is_some());
        assert!(store.find("nope").is_none());
    }

    #[test]
    fn parent_account_of_finds_stream_owner() {
        let mut store = store_with_accounts();
        let account_id = account_node_id("ac-2");
        store.replace_children(
            &account_id,
            vec![TreeNode::Stream(StreamNode::named("ac-2", "events"))],
        );

        let parent = store
            .parent_account_of(&stream_node_id("ac-2", "events"))
            .expect("parent account");
        assert_eq!(parent.account_id, "ac-2");
    }

    #[test]
    fn replace_children_on_missing_node_reports_false() {
        let mut store = store_with_accounts();
        assert!(!store.replace_children("gone", Vec::new()));
    }

    #[test]
    fn reloading_accounts_replaces_wholesale() {
        let mut store = store_with_accounts();
        store.load_accounts(&[summary("ac-3", "ops", false)]);
        let accounts = store.account_nodes();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id, "ac-3");
    }
}
