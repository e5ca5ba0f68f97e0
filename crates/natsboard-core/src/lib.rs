//! Lazy resource-tree engine between `natsboard-api` and UI consumers.
//!
//! This crate owns the tree model and loading logic for one messaging
//! cluster's namespace (cluster → accounts → streams → consumers):
//!
//! - **[`TreeLoader`]** — Central facade. [`initialize()`](TreeLoader::initialize)
//!   builds the root and loads the account level;
//!   [`select()`](TreeLoader::select) lazily loads whatever level the
//!   selected node needs; [`refresh()`](TreeLoader::refresh) force-refetches
//!   the selected subtree past the cache.
//! - **[`TreeStore`]** — The node graph. Single writer, flat child
//!   replacement, depth-first lookup.
//! - **[`StreamListCache`]** — TTL cache for per-account stream listings,
//!   keyed by resource identity so entries survive node replacement.
//! - **[`InflightTracker`]** — Collapses concurrent fetches for the same
//!   node into one request.
//! - **[`Introspect`]** — The seam to the control plane; implemented by
//!   [`natsboard_api::ControlPlaneClient`] and by scripted mocks in tests.
//! - **Error classification** ([`classify`]) — Maps raw failure text to a
//!   closed taxonomy with severity and a suggested remedy, attached to
//!   the failing node instead of tearing down the tree.

pub mod cache;
pub mod classify;
mod detect;
pub mod error;
pub mod inflight;
pub mod introspect;
pub mod loader;
pub mod merge;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheKey, DEFAULT_TTL, StreamListCache};
pub use classify::{ErrorInfo, ErrorKind, Severity, SuggestedAction, classify};
pub use error::CoreError;
pub use inflight::{InflightGuard, InflightTracker};
pub use introspect::Introspect;
pub use loader::{DEFAULT_PAGE_SIZE, TreeLoader};
pub use merge::merge_streams;
pub use store::TreeStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccountNode,
    ClusterNode,
    ConsumerNode,
    Expandability,
    NodeHeader,
    NodeKind,
    StreamNode,
    TreeNode,
    account_node_id,
    cluster_node_id,
    consumer_node_id,
    stream_node_id,
};
