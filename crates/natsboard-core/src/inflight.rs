// ── In-flight request tracker ──
//
// Deduplicates concurrent fetches for the same node. Acquisition is an
// atomic insert; release is driven by guard drop so it fires on every
// exit path -- success, failure, or early return.

use std::sync::Arc;

use dashmap::DashSet;

/// Set of node keys with a remote fetch currently in flight.
#[derive(Debug, Default, Clone)]
pub struct InflightTracker {
    keys: Arc<DashSet<String>>,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a key. Returns `None` if a fetch for this key is
    /// already in flight; the returned guard releases the key on drop.
    pub fn try_acquire(&self, key: &str) -> Option<InflightGuard> {
        if self.keys.insert(key.to_owned()) {
            Some(InflightGuard {
                keys: Arc::clone(&self.keys),
                key: key.to_owned(),
            })
        } else {
            None
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// RAII handle for an in-flight key.
#[derive(Debug)]
pub struct InflightGuard {
    keys: Arc<DashSet<String>>,
    key: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let tracker = InflightTracker::new();
        let guard = tracker.try_acquire("account_1");
        assert!(guard.is_some());
        assert!(tracker.try_acquire("account_1").is_none());
        assert!(tracker.is_held("account_1"));
    }

    #[test]
    fn drop_releases_key() {
        let tracker = InflightTracker::new();
        {
            let _guard = tracker.try_acquire("account_1").expect("first acquire");
        }
        assert!(!tracker.is_held("account_1"));
        assert!(tracker.try_acquire("account_1").is_some());
    }

    #[test]
    fn distinct_keys_are_independent() {
        let tracker = InflightTracker::new();
        let _a = tracker.try_acquire("account_1").expect("acquire a");
        assert!(tracker.try_acquire("account_2").is_some());
    }
}
