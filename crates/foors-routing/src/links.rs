//! Link recomputation: symmetric neighbor sets from positions and radii.
//!
//! Rebuilt from scratch every pass — links in this mesh are too volatile
//! for incremental maintenance to pay off.  The pass is a deterministic
//! O(n²) pairwise scan; at the node counts this engine targets (tens to a
//! few hundred) that is far below the cost of the routing BFS that follows.

use std::collections::{BTreeMap, BTreeSet};

use foors_core::{NodeId, Vec2};
use foors_node::NodeStore;

/// What changed in the topology during one link recompute.
///
/// The engine's boundary-replay and queue-flush steps are driven entirely
/// by this diff.
#[derive(Default, Debug, Clone)]
pub struct LinkDiff {
    /// Directed `(node, peer)` pairs where `peer` newly appeared in
    /// `node`'s neighbor set.  A fresh undirected link contributes both
    /// directions, because each endpoint replays its own catalog.
    pub new_links: Vec<(NodeId, NodeId)>,

    /// Nodes that went from zero neighbors to at least one, ascending.
    pub reconnected: Vec<NodeId>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.new_links.is_empty() && self.reconnected.is_empty()
    }
}

/// Rebuild every node's neighbor set and report what changed.
///
/// A link `a — b` exists iff `dist(a, b) <= max(r_a, r_b)` where `r` is the
/// connection radius.  The produced sets are symmetric by construction.
pub fn recompute_links(store: &mut NodeStore) -> LinkDiff {
    // Snapshot positions/radii once; the pairwise scan reads only this.
    let snapshot: Vec<(NodeId, Vec2, f64)> = store
        .iter()
        .map(|n| (n.id, n.position, n.connection_radius))
        .collect();

    let mut fresh: BTreeMap<NodeId, BTreeSet<NodeId>> =
        snapshot.iter().map(|&(id, _, _)| (id, BTreeSet::new())).collect();

    for (i, &(a, pa, ra)) in snapshot.iter().enumerate() {
        for &(b, pb, rb) in &snapshot[i + 1..] {
            if pa.distance(pb) <= ra.max(rb) {
                fresh.get_mut(&a).unwrap().insert(b);
                fresh.get_mut(&b).unwrap().insert(a);
            }
        }
    }

    let mut diff = LinkDiff::default();
    for node in store.iter_mut() {
        let current = fresh.remove(&node.id).unwrap_or_default();
        let previous = std::mem::replace(&mut node.neighbors, current);

        for &peer in node.neighbors.difference(&previous) {
            diff.new_links.push((node.id, peer));
        }
        if previous.is_empty() && !node.neighbors.is_empty() {
            diff.reconnected.push(node.id);
        }
    }
    diff
}
