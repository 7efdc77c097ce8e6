//! Target selection: which peers receive one emission.
//!
//! The selector is read-only — it inspects the store and the current link
//! loads and returns an ordered list of peers.  The emitting code in the
//! engine crate owns message creation.
//!
//! # Modes
//!
//! - **Intelligent**: greedy maximum-coverage over the sinks reachable
//!   through each candidate next-hop, capped by severity, tie-broken by
//!   link load and then ascending `NodeId` for reproducibility.
//! - **Flooding / inactive**: every neighbor except the excluded sender.
//! - **No-connections**: nothing.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use foors_core::{MessageKind, NodeId, RoutingMode, Severity, SinkId, TimeMs};
use foors_node::{Node, NodeStore};

/// In-flight message counts per directed `(from, to)` link.
///
/// Built by the engine from the live message list (`progress < 1` only);
/// used as the greedy tie-break so redundant paths spread load.
pub type LinkLoad = FxHashMap<(NodeId, NodeId), usize>;

/// Upper bound on distinct next-hops for one emission.
#[inline]
fn fanout_cap(kind: MessageKind, severity: Option<Severity>) -> usize {
    match kind {
        MessageKind::Triage => severity.map_or(1, Severity::fanout_cap),
        MessageKind::Normal => 1,
    }
}

/// Choose the peers one emission from `from` goes to.
///
/// `exclude` is the arrival sender on a forward, kept out of every mode's
/// candidate set to avoid immediate echo.  Returns an empty vec when the
/// node is unknown, isolated, or (in intelligent mode) has no active
/// coverage — the caller treats that as a silent drop.
pub fn select_targets(
    store:           &NodeStore,
    from:            NodeId,
    exclude:         Option<NodeId>,
    kind:            MessageKind,
    severity:        Option<Severity>,
    loads:           &LinkLoad,
    now:             TimeMs,
    route_expiry_ms: u64,
) -> Vec<NodeId> {
    let Some(node) = store.get(from) else { return Vec::new() };

    match node.routing_state.mode {
        RoutingMode::NoConnections => Vec::new(),

        RoutingMode::Flooding | RoutingMode::Inactive => node
            .neighbors
            .iter()
            .copied()
            .filter(|p| Some(*p) != exclude)
            .collect(),

        RoutingMode::Intelligent => {
            let coverage = neighbor_coverage(node, exclude, now, route_expiry_ms);
            pick_by_coverage(from, coverage, fanout_cap(kind, severity), loads)
        }
    }
}

/// `peer → sinks reachable through peer via an active (unexpired) route`.
fn neighbor_coverage(
    node:            &Node,
    exclude:         Option<NodeId>,
    now:             TimeMs,
    route_expiry_ms: u64,
) -> BTreeMap<NodeId, BTreeSet<SinkId>> {
    let mut coverage: BTreeMap<NodeId, BTreeSet<SinkId>> = BTreeMap::new();
    for (&sink, entry) in &node.routing_table {
        if entry.is_expired(now, route_expiry_ms) {
            continue;
        }
        for &hop in entry.next_hops.keys() {
            if Some(hop) != exclude {
                coverage.entry(hop).or_default().insert(sink);
            }
        }
    }
    coverage
}

/// Greedy maximum-coverage with load tie-break.
///
/// Iteration is in ascending peer ID and comparisons are strict, so exact
/// ties resolve to the lowest ID — the documented reproducibility rule.
/// Zero-gain candidates still fill remaining cap slots (redundant paths
/// are the point of the higher severity caps).
fn pick_by_coverage(
    from:     NodeId,
    coverage: BTreeMap<NodeId, BTreeSet<SinkId>>,
    cap:      usize,
    loads:    &LinkLoad,
) -> Vec<NodeId> {
    if coverage.is_empty() || cap == 0 {
        return Vec::new();
    }
    if coverage.len() <= cap {
        return coverage.into_keys().collect();
    }

    let link_load = |peer: NodeId| loads.get(&(from, peer)).copied().unwrap_or(0);

    let mut remaining = coverage;
    let mut covered: BTreeSet<SinkId> = BTreeSet::new();
    let mut selected: Vec<NodeId> = Vec::with_capacity(cap);

    while selected.len() < cap && !remaining.is_empty() {
        let mut best: Option<(NodeId, usize, usize)> = None; // (peer, gain, load)
        for (&peer, sinks) in &remaining {
            let gain = sinks.difference(&covered).count();
            let load = link_load(peer);
            let better = match best {
                None => true,
                Some((_, bg, bl)) => gain > bg || (gain == bg && load < bl),
            };
            if better {
                best = Some((peer, gain, load));
            }
        }
        let Some((winner, _, _)) = best else { break };
        let sinks = remaining.remove(&winner).expect("winner came from remaining");
        covered.extend(sinks);
        selected.push(winner);
    }

    if selected.is_empty() {
        // Degenerate coverage: fall back to the least-loaded candidate.
        if let Some(&peer) = remaining.keys().min_by_key(|&&p| (link_load(p), p)) {
            selected.push(peer);
        }
    }
    selected
}
