//! Routing-table entry types.
//!
//! A node keeps one [`RouteEntry`] per reachable sink and one
//! [`InactiveRoute`] per sink that recently became unreachable.  The two
//! tables are disjoint by construction: the routing-table builder moves an
//! entry from one to the other, never copies it.

use std::collections::BTreeMap;

use foors_core::{NodeId, SinkId, TimeMs};

// ── RouteEntry ───────────────────────────────────────────────────────────────

/// Active routes from one node toward one sink.
///
/// Maps each usable next-hop neighbor to the total hop count of the path
/// through that neighbor.  Never empty while the entry exists; equal-depth
/// BFS ties produce multiple next-hops on purpose, exposing path redundancy
/// to the target selector.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEntry {
    /// `next_hop → total hop count via that hop`.  Every key is a current
    /// neighbor one BFS level closer to the sink.
    pub next_hops: BTreeMap<NodeId, u32>,

    /// When the routing pass last wrote this entry.
    pub last_update: TimeMs,
}

impl RouteEntry {
    pub fn new(next_hops: BTreeMap<NodeId, u32>, now: TimeMs) -> Self {
        Self { next_hops, last_update: now }
    }

    /// `true` once the entry has gone unrefreshed longer than `expiry_ms`.
    #[inline]
    pub fn is_expired(&self, now: TimeMs, expiry_ms: u64) -> bool {
        now.since(self.last_update) > expiry_ms
    }

    /// The lowest total hop count across all next-hops.
    pub fn best_hop_count(&self) -> Option<u32> {
        self.next_hops.values().copied().min()
    }
}

// ── InactiveRoute ────────────────────────────────────────────────────────────

/// Snapshot of a route whose sink became unreachable.
///
/// Retained for the configured grace period so a briefly-lost sink can
/// return without the node dropping back to blind flooding.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InactiveRoute {
    /// The last active next-hop map, kept for observability.
    pub next_hops: BTreeMap<NodeId, u32>,

    /// `last_update` of the entry at the moment of demotion.
    pub last_update: TimeMs,

    /// When the routing pass demoted the entry.
    pub inactive_since: TimeMs,
}

impl InactiveRoute {
    /// Demote an active entry, stamping the demotion time.
    pub fn demoted(entry: RouteEntry, now: TimeMs) -> Self {
        Self {
            next_hops:      entry.next_hops,
            last_update:    entry.last_update,
            inactive_since: now,
        }
    }

    /// `true` once the grace period has fully elapsed.
    #[inline]
    pub fn is_stale(&self, now: TimeMs, timeout_ms: u64) -> bool {
        now.since(self.inactive_since) > timeout_ms
    }
}

/// Convenience alias for a node's active routing table.
pub type RoutingTable = BTreeMap<SinkId, RouteEntry>;

/// Convenience alias for a node's demoted-route table.
pub type InactiveTable = BTreeMap<SinkId, InactiveRoute>;
