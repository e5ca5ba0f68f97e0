// ── Stream merge rule ──
//
// Stream data for one account arrives from multiple partial sources: the
// authoritative name listing, plus zero or more detail payloads (e.g.
// embedded in a detection response). The merge is deterministic and
// idempotent: the result is rebuilt from the same inputs every time, so
// re-running it never drifts.

use serde_json::Value;
use tracing::debug;

use natsboard_api::{DetectionResponse, StreamDetail};

use crate::model::StreamNode;

/// Build the full stream-node set for one account.
///
/// The primary listing is authoritative for existence and ordering.
/// Supplementary details overlay config/state fields onto matching names
/// (supplement wins on conflicts) and append names the listing lacks.
pub fn merge_streams(
    account_id: &str,
    listing: &[String],
    supplements: &[StreamDetail],
) -> Vec<StreamNode> {
    let mut nodes: Vec<StreamNode> = listing
        .iter()
        .map(|name| StreamNode::named(account_id, name))
        .collect();

    for detail in supplements {
        let Some(name) = detail.name() else {
            debug!("skipping supplementary stream payload without a config.name");
            continue;
        };

        match nodes.iter_mut().find(|n| n.name == name) {
            Some(node) => overlay(node, detail),
            None => {
                let mut node = StreamNode::named(account_id, name);
                overlay(&mut node, detail);
                nodes.push(node);
            }
        }
    }

    nodes
}

/// Overlay one detail payload onto a stream node, field by field.
/// Supplement values win on key conflicts.
fn overlay(node: &mut StreamNode, detail: &StreamDetail) {
    let config = node.config.get_or_insert_with(serde_json::Map::new);
    config.extend(detail.config.clone());

    let state = node.state.get_or_insert_with(serde_json::Map::new);
    state.extend(detail.state.clone());

    if detail.cluster.is_some() {
        node.placement.clone_from(&detail.cluster);
    }
    if detail.created.is_some() {
        node.created = detail.created;
    }
    if detail.ts.is_some() {
        node.ts = detail.ts;
    }
}

/// Pull supplementary stream details out of a detection response.
///
/// The control plane nests them as `account_details[].stream_detail`,
/// where `account_details` entries may be objects or arrays. Anything
/// that doesn't parse as a stream detail is skipped.
pub fn supplements_from_detection(detection: &DetectionResponse) -> Vec<StreamDetail> {
    let mut details = Vec::new();

    for entry in &detection.account_details {
        let items: Vec<&Value> = match entry {
            Value::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        for item in items {
            let Some(raw_streams) = item.get("stream_detail").and_then(Value::as_array) else {
                continue;
            };
            for raw in raw_streams {
                match serde_json::from_value::<StreamDetail>(raw.clone()) {
                    Ok(detail) if detail.name().is_some() => details.push(detail),
                    Ok(_) => debug!("dropping stream detail without a name"),
                    Err(e) => debug!(error = %e, "unparseable stream detail in detection payload"),
                }
            }
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(name: &str, extra_config: &[(&str, Value)], state: &[(&str, Value)]) -> StreamDetail {
        let mut config = serde_json::Map::new();
        config.insert("name".into(), json!(name));
        for (k, v) in extra_config {
            config.insert((*k).to_owned(), v.clone());
        }
        let mut state_map = serde_json::Map::new();
        for (k, v) in state {
            state_map.insert((*k).to_owned(), v.clone());
        }
        StreamDetail {
            config,
            state: state_map,
            cluster: None,
            created: None,
            ts: None,
        }
    }

    #[test]
    fn listing_alone_yields_name_only_nodes() {
        let nodes = merge_streams("ac-1", &["s1".into(), "s2".into()], &[]);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "s1");
        assert!(nodes[0].config.is_none());
    }

    #[test]
    fn supplement_overlays_matching_name() {
        let sup = detail("s1", &[("num_replicas", json!(3))], &[("messages", json!(9))]);
        let nodes = merge_streams("ac-1", &["s1".into(), "s2".into()], &[sup]);

        assert_eq!(nodes.len(), 2);
        let s1 = &nodes[0];
        assert_eq!(
            s1.config.as_ref().and_then(|c| c.get("num_replicas")),
            Some(&json!(3))
        );
        assert_eq!(
            s1.state.as_ref().and_then(|s| s.get("messages")),
            Some(&json!(9))
        );
        assert!(nodes[1].config.is_none());
    }

    #[test]
    fn supplement_appends_unlisted_name() {
        let sup = detail("s3", &[], &[]);
        let nodes = merge_streams("ac-1", &["s1".into()], &[sup]);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].name, "s3");
    }

    #[test]
    fn merge_is_idempotent() {
        let listing = vec!["s1".to_owned(), "s2".to_owned()];
        let sups = vec![detail("s1", &[("storage", json!("file"))], &[])];

        let once = merge_streams("ac-1", &listing, &sups);
        let twice = merge_streams("ac-1", &listing, &sups);

        let as_json = |nodes: &[StreamNode]| serde_json::to_value(nodes).expect("serializable");
        assert_eq!(as_json(&once), as_json(&twice));
    }

    #[test]
    fn detection_supplements_are_extracted_from_nested_shapes() {
        let detection: DetectionResponse = serde_json::from_value(json!({
            "streams": 2,
            "account_details": [
                {"stream_detail": [{"config": {"name": "s1"}, "state": {"messages": 1}}]},
                [{"stream_detail": [{"config": {"name": "s2"}}]}],
                {"no_streams_here": true}
            ]
        }))
        .expect("valid detection payload");

        let sups = supplements_from_detection(&detection);
        assert_eq!(sups.len(), 2);
        assert_eq!(sups[0].name(), Some("s1"));
        assert_eq!(sups[1].name(), Some("s2"));
    }
}
