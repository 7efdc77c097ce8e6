//! Routing-table construction: BFS from every sink.
//!
//! # Pass structure
//!
//! 1. Demote every entry whose sink is no longer a sink in the world
//!    (removed or toggled back to source).
//! 2. For each sink, BFS over the undirected neighbor graph.  Every other
//!    node reached at depth `d` gets an entry listing *all* neighbors at
//!    depth `d − 1` — equal-depth ties are kept on purpose so the target
//!    selector can exploit redundant paths.  A node with an existing entry
//!    that BFS could not reach has that entry demoted instead.
//! 3. Delete inactive entries older than the configured grace period.
//!
//! BFS (not Dijkstra): links are unweighted hops, and the per-sink frontier
//! expansion over `BTreeSet` neighbors is deterministic without a priority
//! queue.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};
use rustc_hash::FxHashMap;

use foors_core::{NodeId, SinkId, TimeMs};
use foors_node::{InactiveRoute, NodeStore, RouteEntry};

/// Run the full routing pass.  `now` stamps fresh entries and demotions;
/// `inactive_timeout_ms` bounds the demoted-route grace period.
pub fn rebuild_routing_tables(store: &mut NodeStore, now: TimeMs, inactive_timeout_ms: u64) {
    let sinks = store.sink_ids();

    demote_unsinked_entries(store, &sinks, now);

    // Adjacency snapshot: neighbor sets are stable for the whole pass, and
    // BFS needs them immutably while entries are being written.
    let adjacency: BTreeMap<NodeId, Vec<NodeId>> = store
        .iter()
        .map(|n| (n.id, n.neighbors.iter().copied().collect()))
        .collect();

    for &sink in &sinks {
        let depth = bfs_depths(&adjacency, sink);

        for id in store.ids() {
            if id == sink {
                continue; // self-routes are never created
            }
            apply_bfs_result(store, id, sink, &depth, now);
        }
    }

    purge_stale_inactive(store, now, inactive_timeout_ms);
}

/// Hop counts from `origin` over the undirected graph.  Absent ⇔ unreachable.
fn bfs_depths(adjacency: &BTreeMap<NodeId, Vec<NodeId>>, origin: NodeId) -> FxHashMap<NodeId, u32> {
    let mut depth: FxHashMap<NodeId, u32> = FxHashMap::default();
    depth.insert(origin, 0);

    let mut frontier = VecDeque::new();
    frontier.push_back(origin);

    while let Some(node) = frontier.pop_front() {
        let d = depth[&node];
        let Some(peers) = adjacency.get(&node) else { continue };
        for &peer in peers {
            depth.entry(peer).or_insert_with(|| {
                frontier.push_back(peer);
                d + 1
            });
        }
    }
    depth
}

/// Write, refresh, or demote the `(node, sink)` entry from one BFS result.
fn apply_bfs_result(
    store: &mut NodeStore,
    id:    NodeId,
    sink:  SinkId,
    depth: &FxHashMap<NodeId, u32>,
    now:   TimeMs,
) {
    let Some(node) = store.get_mut(id) else { return };

    match depth.get(&id) {
        Some(&d) => {
            // Every neighbor exactly one level closer is a usable next-hop.
            let next_hops: BTreeMap<NodeId, u32> = node
                .neighbors
                .iter()
                .copied()
                .filter(|p| depth.get(p) == Some(&(d - 1)))
                .map(|p| (p, d))
                .collect();
            debug_assert!(!next_hops.is_empty(), "reached node must have a BFS parent");

            if node.inactive_routes.remove(&sink).is_some() {
                debug!("{id}: route to {sink} reconnected at {d} hops");
            }
            node.routing_table.insert(sink, RouteEntry::new(next_hops, now));
        }
        None => {
            if let Some(entry) = node.routing_table.remove(&sink) {
                trace!("{id}: route to {sink} lost, demoting");
                node.inactive_routes.insert(sink, InactiveRoute::demoted(entry, now));
            }
            // No prior entry → nothing to demote.
        }
    }
}

/// Demote every entry whose key no longer names a sink.
fn demote_unsinked_entries(store: &mut NodeStore, sinks: &[SinkId], now: TimeMs) {
    for node in store.iter_mut() {
        let gone: Vec<SinkId> = node
            .routing_table
            .keys()
            .copied()
            .filter(|s| !sinks.contains(s))
            .collect();
        for sink in gone {
            let entry = node.routing_table.remove(&sink).expect("key just listed");
            trace!("{}: sink {sink} left the world, demoting route", node.id);
            node.inactive_routes.insert(sink, InactiveRoute::demoted(entry, now));
        }
    }
}

/// Drop inactive entries whose grace period has fully elapsed.
fn purge_stale_inactive(store: &mut NodeStore, now: TimeMs, timeout_ms: u64) {
    for node in store.iter_mut() {
        node.inactive_routes.retain(|sink, route| {
            let keep = !route.is_stale(now, timeout_ms);
            if !keep {
                debug!("{}: inactive route to {sink} timed out", node.id);
            }
            keep
        });
    }
}
