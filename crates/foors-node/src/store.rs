//! `NodeStore` — the single owning arena for all nodes.
//!
//! # Why a `BTreeMap` arena
//!
//! Nodes are added and removed at runtime and reference each other by ID,
//! so slot-index storage would either leak slots or reuse IDs.  A
//! `BTreeMap<NodeId, Node>` with a monotonic allocator gives stable IDs,
//! O(log n) lookup, and — just as important — *deterministic ascending-ID
//! iteration*, which every recompute pass and replay relies on for
//! reproducible emission order.

use std::collections::BTreeMap;

use foors_core::{NodeId, NodeKind, Vec2};

use crate::node::Node;

/// ID-keyed arena owning every node in the world.
#[derive(Default, Clone, Debug)]
pub struct NodeStore {
    nodes:   BTreeMap<NodeId, Node>,
    next_id: u32,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Create a node and return its freshly allocated ID.
    pub fn spawn(&mut self, kind: NodeKind, position: Vec2, connection_radius: f64) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind, position, connection_radius));
        id
    }

    /// Remove a node, purging its ID from every remaining neighbor set.
    ///
    /// Routing entries that point to or through the removed node are left
    /// for the next routing pass to demote.  Returns the removed node, or
    /// `None` if the ID was unknown (already-removed IDs are silent no-ops
    /// at the API layer).
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        for other in self.nodes.values_mut() {
            other.neighbors.remove(&id);
        }
        Some(node)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    // ── Iteration (always ascending NodeId) ───────────────────────────────

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// All node IDs, ascending.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// IDs of all sink nodes, ascending.
    pub fn sink_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_sink())
            .map(|n| n.id)
            .collect()
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of undirected links.  Neighbor sets are symmetric, so this is
    /// half the sum of degrees.
    pub fn link_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    /// Undirected link list as `(a, b)` pairs with `a < b`, ascending.
    pub fn links(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        for node in self.nodes.values() {
            for &peer in node.neighbors.range(node.id..) {
                if peer > node.id {
                    out.push((node.id, peer));
                }
            }
        }
        out
    }

    /// Clear all nodes without resetting the ID allocator: IDs stay unique
    /// across a model reset.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
