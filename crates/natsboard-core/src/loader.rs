// ── Lazy tree loader ──
//
// The engine's public surface: selection-driven dispatch over the node
// graph. Each level loads on first selection, results are cached with a
// TTL, and concurrent requests for the same node collapse to one fetch.
//
// Locking discipline: `store` and `state` are plain mutexes that are
// never held across an await. Every remote call snapshots what it needs
// under the lock, releases it, awaits, then re-locks to write back.
// Late results for nodes that vanished in between are dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use natsboard_api::{ClusterSummary, DetectionResponse};

use crate::cache::{CacheKey, StreamListCache};
use crate::classify::{ErrorInfo, classify};
use crate::detect::{needs_detection, run_detection};
use crate::error::CoreError;
use crate::inflight::InflightTracker;
use crate::introspect::Introspect;
use crate::merge::{merge_streams, supplements_from_detection};
use crate::model::{ConsumerNode, Expandability, TreeNode};
use crate::store::TreeStore;

/// Listing endpoints are paged; one page this size covers any tenant we
/// have seen in practice.
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Selection and coarse load progress, for hosts that render a tree
/// panel with a progress bar.
#[derive(Debug, Default)]
struct ViewState {
    selected: Option<String>,
    loading: bool,
    progress: u8,
}

/// Lazily loads one cluster's resource tree through an [`Introspect`]
/// backend.
#[derive(Debug)]
pub struct TreeLoader<S: Introspect> {
    api: S,
    cluster_id: String,
    page_size: u32,
    store: Mutex<TreeStore>,
    cache: StreamListCache,
    inflight: InflightTracker,
    state: Mutex<ViewState>,
}

impl<S: Introspect> TreeLoader<S> {
    pub fn new(api: S, cluster_id: impl Into<String>) -> Self {
        Self {
            api,
            cluster_id: cluster_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            store: Mutex::new(TreeStore::new()),
            cache: StreamListCache::new(),
            inflight: InflightTracker::new(),
            state: Mutex::new(ViewState::default()),
        }
    }

    /// Override the stream-listing cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = StreamListCache::with_ttl(ttl);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Build the root and load the account level. Cluster metadata is
    /// reused when the host already has it, fetched otherwise. Remote
    /// failures land on the root node as classified errors rather than
    /// escaping; the tree is always left in a renderable state.
    pub async fn initialize(&self, known: Option<ClusterSummary>) {
        self.set_progress(true, 0);

        let mut root_error = None;
        let metadata = match known {
            Some(meta) => Some(meta),
            None => match self.api.cluster_metadata(&self.cluster_id).await {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!(cluster = %self.cluster_id, error = %e, "cluster metadata fetch failed");
                    root_error = Some(classify(&e.to_string(), &self.cluster_id));
                    None
                }
            },
        };

        {
            let mut store = self.store();
            store.initialize_root(&self.cluster_id, metadata);
            if let Some(err) = root_error
                && let Some(root) = store.find_mut(&self.root_id())
            {
                root.header_mut().error = Some(err);
            }
        }
        self.set_progress(true, 50);

        self.load_account_level().await;
        self.set_progress(true, 80);

        if self.store_needs_detection() {
            run_detection(&self.store, &self.api, &self.cluster_id, self.page_size).await;
        }
        self.set_progress(true, 100);
        self.set_progress(false, 0);

        info!(cluster = %self.cluster_id, "resource tree initialized");
    }

    /// Select a node, lazily loading whatever that level needs.
    ///
    /// Remote failures are classified and attached to the node; only
    /// structural problems (unknown id, orphaned stream) surface as
    /// errors here.
    pub async fn select(&self, node_id: &str) -> Result<(), CoreError> {
        let node = {
            let store = self.store();
            let Some(node) = store.find(node_id) else {
                return Err(CoreError::NodeNotFound {
                    id: node_id.to_owned(),
                });
            };
            node.clone()
        };

        self.state().selected = Some(node_id.to_owned());

        match node {
            TreeNode::Cluster(cluster) => {
                let needs_accounts = cluster
                    .header
                    .children
                    .as_ref()
                    .is_none_or(Vec::is_empty);
                if needs_accounts {
                    self.load_account_level().await;
                }
                if self.store_needs_detection() {
                    run_detection(&self.store, &self.api, &self.cluster_id, self.page_size).await;
                }
                Ok(())
            }
            TreeNode::Account(account) => {
                if account.expandability == Expandability::NotExpandable {
                    debug!(account = %account.header.label, "skipping load; account has no streams");
                    return Ok(());
                }
                self.load_account_streams(&account.header.id, &account.account_id)
                    .await;
                Ok(())
            }
            TreeNode::Stream(stream) => {
                if stream.has_detail() {
                    debug!(stream = %stream.name, "detail already loaded");
                    return Ok(());
                }
                self.load_stream_detail(node_id, &stream.name).await
            }
            // Leaves have nothing below them.
            TreeNode::Consumer(_) => Ok(()),
        }
    }

    /// Force-refetch the currently selected subtree, bypassing the
    /// cache. No-op without a selection.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let Some(selected) = self.selected_id() else {
            return Ok(());
        };

        enum Plan {
            Cluster,
            Account { node_id: String, account_id: String },
            Vanished,
            Noop,
        }

        let plan = {
            let store = self.store();
            match store.find(&selected) {
                None => Plan::Vanished,
                Some(TreeNode::Cluster(_)) => Plan::Cluster,
                Some(TreeNode::Account(a)) => Plan::Account {
                    node_id: a.header.id.clone(),
                    account_id: a.account_id.clone(),
                },
                Some(TreeNode::Stream(_)) => {
                    let parent = store.parent_account_of(&selected).ok_or_else(|| {
                        CoreError::ParentAccountMissing {
                            id: selected.clone(),
                        }
                    })?;
                    Plan::Account {
                        node_id: parent.header.id.clone(),
                        account_id: parent.account_id.clone(),
                    }
                }
                // Consumers carry no refetchable payload of their own.
                Some(TreeNode::Consumer(_)) => Plan::Noop,
            }
        };

        match plan {
            Plan::Noop => Ok(()),
            Plan::Vanished => {
                self.state().selected = None;
                Ok(())
            }
            Plan::Cluster => {
                self.cache.clear();
                self.load_account_level().await;
                if self.store_needs_detection() {
                    run_detection(&self.store, &self.api, &self.cluster_id, self.page_size).await;
                }
                Ok(())
            }
            Plan::Account {
                node_id,
                account_id,
            } => {
                self.cache
                    .invalidate(&CacheKey::new(&self.cluster_id, &account_id));
                self.load_account_streams(&node_id, &account_id).await;

                // A refreshed listing may no longer contain the
                // selected stream.
                if self.store().find(&selected).is_none() {
                    debug!(node = %selected, "selection vanished on refresh");
                    self.state().selected = None;
                }
                Ok(())
            }
        }
    }

    // ── Level loaders ────────────────────────────────────────────────

    async fn load_account_level(&self) {
        match self.api.list_accounts(&self.cluster_id, self.page_size).await {
            Ok(accounts) => {
                let count = self.store().load_accounts(&accounts);
                debug!(count, "account level loaded");
            }
            Err(e) => {
                warn!(cluster = %self.cluster_id, error = %e, "account listing failed");
                let info = classify(&e.to_string(), &self.cluster_id);
                if let Some(root) = self.store().find_mut(&self.root_id()) {
                    root.header_mut().error = Some(info);
                }
            }
        }
    }

    /// Load one account's stream children: cache first, then a
    /// deduplicated remote fetch. The cache is written before the store
    /// so a concurrent reader never observes children the cache cannot
    /// reproduce.
    async fn load_account_streams(&self, node_id: &str, account_id: &str) {
        let key = CacheKey::new(&self.cluster_id, account_id);
        if let Some((names, true)) = self.cache.get(&key) {
            debug!(account = account_id, "serving stream listing from cache");
            self.apply_stream_listing(node_id, account_id, &names);
            return;
        }

        let Some(_guard) = self.inflight.try_acquire(node_id) else {
            debug!(node = node_id, "stream fetch already in flight");
            return;
        };

        if let Some(node) = self.store().find_mut(node_id) {
            let header = node.header_mut();
            header.loading = true;
            header.error = None;
        }

        match self
            .api
            .list_stream_names(&self.cluster_id, account_id, self.page_size)
            .await
        {
            Ok(names) => {
                self.cache.put(key, names.clone());
                self.apply_stream_listing(node_id, account_id, &names);
            }
            Err(e) => {
                warn!(account = account_id, error = %e, "stream listing failed");
                let mut store = self.store();
                if let Some(node) = store.find_mut(node_id) {
                    let label = node.label().to_owned();
                    let header = node.header_mut();
                    header.loading = false;
                    header.error = Some(classify(&e.to_string(), &label));
                }
            }
        }
    }

    /// Write a stream listing into the account node, merging in any
    /// supplementary details the detection probe already delivered.
    fn apply_stream_listing(&self, node_id: &str, account_id: &str, names: &[String]) {
        let mut store = self.store();
        let Some(account) = store.find_mut(node_id).and_then(TreeNode::as_account_mut) else {
            debug!(node = node_id, "dropping stream listing for vanished node");
            return;
        };

        let supplements = account
            .detection
            .as_ref()
            .map(supplements_from_detection)
            .unwrap_or_default();
        let children: Vec<TreeNode> = merge_streams(account_id, names, &supplements)
            .into_iter()
            .map(TreeNode::Stream)
            .collect();

        let has_streams = !children.is_empty();
        account.jetstream_enabled = has_streams;
        account.expandability = if has_streams {
            Expandability::Expandable
        } else {
            Expandability::NotExpandable
        };
        account.header.children = Some(children);
        account.header.loading = false;
        account.header.error = None;
    }

    /// Fetch a stream's full detail and its consumer list in one go.
    /// Applied all-or-nothing so `has_detail` stays a reliable "already
    /// loaded" check.
    async fn load_stream_detail(&self, node_id: &str, stream_name: &str) -> Result<(), CoreError> {
        let parent_account_id = {
            let store = self.store();
            store
                .parent_account_of(node_id)
                .map(|a| a.account_id.clone())
                .ok_or_else(|| CoreError::ParentAccountMissing {
                    id: node_id.to_owned(),
                })?
        };

        let Some(_guard) = self.inflight.try_acquire(node_id) else {
            debug!(node = node_id, "detail fetch already in flight");
            return Ok(());
        };

        if let Some(node) = self.store().find_mut(node_id) {
            let header = node.header_mut();
            header.loading = true;
            header.error = None;
        }

        let (detail, consumers) = tokio::join!(
            self.api
                .stream_detail(&self.cluster_id, &parent_account_id, stream_name),
            self.api.list_consumers(&self.cluster_id, stream_name),
        );

        let mut store = self.store();
        let Some(TreeNode::Stream(stream)) = store.find_mut(node_id) else {
            debug!(node = node_id, "dropping stream detail for vanished node");
            return Ok(());
        };
        stream.header.loading = false;

        match (detail, consumers) {
            (Ok(detail), Ok(consumers)) => {
                stream.config = Some(detail.config);
                stream.state = Some(detail.state);
                stream.placement = detail.cluster;
                stream.created = detail.created;
                stream.ts = detail.ts;
                stream.header.error = None;
                stream.header.children = Some(
                    consumers
                        .iter()
                        .map(|name| TreeNode::Consumer(ConsumerNode::new(stream_name, name)))
                        .collect(),
                );
                debug!(stream = stream_name, consumers = consumers.len(), "stream detail loaded");
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(stream = stream_name, error = %e, "stream detail fetch failed");
                let label = stream.header.label.clone();
                stream.header.error = Some(classify(&e.to_string(), &label));
            }
        }
        Ok(())
    }

    // ── Observers ────────────────────────────────────────────────────

    /// A snapshot of the whole tree.
    pub fn tree(&self) -> Option<TreeNode> {
        self.store().root().cloned()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state().selected.clone()
    }

    /// A snapshot of the selected node, if the selection still resolves.
    pub fn selected(&self) -> Option<TreeNode> {
        let id = self.selected_id()?;
        self.store().find(&id).cloned()
    }

    pub fn node_error(&self, node_id: &str) -> Option<ErrorInfo> {
        self.store()
            .find(node_id)
            .and_then(|node| node.header().error.clone())
    }

    /// `true` if a stream listing for the account is currently cached
    /// (fresh or stale).
    pub fn has_cached_listing(&self, account_id: &str) -> bool {
        self.cache
            .contains(&CacheKey::new(&self.cluster_id, account_id))
    }

    /// Last successful detection payload for an account node.
    pub fn account_stats(&self, node_id: &str) -> Option<DetectionResponse> {
        self.store()
            .find(node_id)
            .and_then(TreeNode::as_account)
            .and_then(|a| a.detection.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn progress(&self) -> u8 {
        self.state().progress
    }

    pub fn root_id(&self) -> String {
        crate::model::cluster_node_id(&self.cluster_id)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn store(&self) -> MutexGuard<'_, TreeStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_progress(&self, loading: bool, progress: u8) {
        let mut state = self.state();
        state.loading = loading;
        state.progress = progress;
    }

    fn store_needs_detection(&self) -> bool {
        needs_detection(&self.store())
    }
}
