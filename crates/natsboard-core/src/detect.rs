// ── Detection orchestrator ──
//
// Pre-computes which accounts are worth expanding so the host UI can
// grey out empty ones without per-click latency. Probes fan out
// concurrently and are joined with per-item outcomes: one account's
// failure never aborts or taints detection for its siblings. A probe
// failure fails open (the account stays expandable) so transient
// backend trouble cannot hide real data.

use std::sync::Mutex;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::introspect::Introspect;
use crate::model::{Expandability, TreeNode};
use crate::store::TreeStore;

/// One eligible account, snapshotted before the fan-out so no store
/// borrow is held across an await.
struct ProbeTarget {
    node_id: String,
    label: String,
    public_key: String,
}

/// `true` if any account under the root still needs probing. Used both
/// as the trigger condition and as the (idempotent) suppression of
/// re-triggers while a probe set is outstanding.
pub(crate) fn needs_detection(store: &TreeStore) -> bool {
    !eligible_targets(store).is_empty()
}

fn eligible_targets(store: &TreeStore) -> Vec<ProbeTarget> {
    store
        .account_nodes()
        .into_iter()
        .filter(|a| {
            a.expandability == Expandability::Unknown
                && a.status.is_active()
                && !a.is_system
                && !a.public_key.is_empty()
        })
        .map(|a| ProbeTarget {
            node_id: a.header.id.clone(),
            label: a.header.label.clone(),
            public_key: a.public_key.clone(),
        })
        .collect()
}

/// Probe every eligible account concurrently and write the outcomes
/// back into the store. Never fails: per-account errors are recorded on
/// the matching node and the batch as a whole always completes.
pub(crate) async fn run_detection<S: Introspect>(
    store: &Mutex<TreeStore>,
    api: &S,
    cluster_id: &str,
    page_size: u32,
) {
    let targets = {
        let guard = store.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        eligible_targets(&guard)
    };
    if targets.is_empty() {
        debug!("no accounts need an expandability probe");
        return;
    }

    debug!(count = targets.len(), "probing account expandability");

    let probes = targets.iter().map(|target| async move {
        let outcome = api
            .probe_account(cluster_id, &target.public_key, page_size)
            .await;
        (target, outcome)
    });
    let settled = join_all(probes).await;

    let mut guard = store.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    for (target, outcome) in settled {
        // The node may have been replaced while probes were in flight;
        // a late result for a vanished node is dropped silently.
        let Some(TreeNode::Account(account)) = guard.find_mut(&target.node_id) else {
            debug!(node = %target.node_id, "dropping detection result for vanished node");
            continue;
        };

        match outcome {
            Ok(detection) => {
                let has_streams = detection.streams > 0;
                account.expandability = if has_streams {
                    Expandability::Expandable
                } else {
                    Expandability::NotExpandable
                };
                account.jetstream_enabled = has_streams;
                account.detection = Some(detection);
                account.header.error = None;
                debug!(
                    account = %target.label,
                    expandable = has_streams,
                    "detection probe settled"
                );
            }
            Err(e) => {
                // Fail open: never block manual expansion behind a
                // transient probe error.
                account.expandability = Expandability::Expandable;
                account.jetstream_enabled = true;
                account.header.error = Some(classify(&e.to_string(), &target.label));
                warn!(
                    account = %target.label,
                    error = %e,
                    "detection probe failed; assuming expandable"
                );
            }
        }
    }
}
