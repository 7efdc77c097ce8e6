//! Boundary replay: catalog synchronization across fresh links and sinks.
//!
//! Two triggers, both driven by diffs captured during recompute:
//!
//! - **New-link replay** seeds a freshly bridged peer with every triage it
//!   is missing, and saturates the sender's suppression map for the sinks
//!   the peer can reach so the same boundary is not re-seeded next tick.
//! - **New-sink replay** runs when a sink gains a routing-table entry for
//!   another sink it could not previously reach (newly created, newly
//!   promoted, or newly bridged): the catalog difference travels along
//!   intelligent paths, not by flooding.
//!
//! Both are written collect-then-apply: an immutable planning scan over
//! the ordered store, then emission and suppression-map updates.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use foors_core::{MessageKind, NodeId, Severity, SinkId, TriageId};

use crate::message::TriagePayload;
use crate::model::MeshModel;

impl MeshModel {
    // ── New-link replay ───────────────────────────────────────────────────

    /// For every directed `(node, peer)` pair that became linked this tick,
    /// push the peer's missing triages across the new boundary.
    pub(crate) fn replay_new_links(&mut self, new_links: &[(NodeId, NodeId)]) {
        for &(n, p) in new_links {
            // A link banked by a mutation may be gone by tick time.
            let still_linked = self
                .nodes
                .get(n)
                .is_some_and(|node| node.neighbors.contains(&p));
            if !still_linked {
                continue;
            }
            let peer_is_sink = match self.nodes.get(p) {
                Some(peer) => peer.is_sink(),
                None => continue,
            };
            if peer_is_sink {
                self.seed_sink_peer(n, p);
            } else {
                self.seed_router_peer(n, p);
            }
        }
    }

    /// Peer is a sink: hand over everything it has not seen, directly.
    fn seed_sink_peer(&mut self, n: NodeId, p: NodeId) {
        let emissions: Vec<(TriageId, Severity)> = {
            let (Some(node), Some(peer)) = (self.nodes.get(n), self.nodes.get(p)) else {
                return;
            };
            node.triage_store
                .iter()
                .filter(|&(&t, _)| !peer.has_seen(t))
                .map(|(&t, &sev)| (t, sev))
                .collect()
        };
        if emissions.is_empty() {
            return;
        }
        debug!("{n}: seeding sink {p} with {} triage(s)", emissions.len());
        for (triage, severity) in emissions {
            self.emit(n, p, MessageKind::Triage, Some(TriagePayload { triage, severity }));
        }
    }

    /// Peer is a router: hand over triages that could still reach a sink
    /// through it, then mark all of the peer's sinks as attempted so this
    /// boundary stays quiet on later ticks.
    fn seed_router_peer(&mut self, n: NodeId, p: NodeId) {
        let (reach, emissions, saturate): (BTreeSet<SinkId>, Vec<(TriageId, Severity)>, Vec<TriageId>) = {
            let (Some(node), Some(peer)) = (self.nodes.get(n), self.nodes.get(p)) else {
                return;
            };
            let reach: BTreeSet<SinkId> = peer.routing_table.keys().copied().collect();
            if reach.is_empty() {
                return; // peer leads nowhere new
            }
            let mut emissions = Vec::new();
            let mut saturate = Vec::new();
            for (&t, &sev) in &node.triage_store {
                if !node.all_targeted(t, reach.iter()) {
                    if !peer.has_seen(t) {
                        emissions.push((t, sev));
                    }
                    saturate.push(t);
                }
            }
            (reach, emissions, saturate)
        };
        if !emissions.is_empty() {
            debug!("{n}: seeding router {p} with {} triage(s)", emissions.len());
        }
        for &(triage, severity) in &emissions {
            self.emit(n, p, MessageKind::Triage, Some(TriagePayload { triage, severity }));
        }
        if let Some(node) = self.nodes.get_mut(n) {
            for t in saturate {
                node.mark_targeted(t, reach.iter().copied());
            }
        }
    }

    // ── New-sink replay ───────────────────────────────────────────────────

    /// Routing-table keys of every current sink — taken before a recompute,
    /// diffed after.
    pub(crate) fn snapshot_sink_routes(&self) -> BTreeMap<NodeId, BTreeSet<SinkId>> {
        self.nodes
            .iter()
            .filter(|n| n.is_sink())
            .map(|n| (n.id, n.routing_table.keys().copied().collect()))
            .collect()
    }

    /// For every sink that can now route to a sink it previously could
    /// not, replay the catalog difference through the routing table.
    pub(crate) fn replay_new_sinks(&mut self, previous: &BTreeMap<NodeId, BTreeSet<SinkId>>) {
        let empty = BTreeSet::new();
        for origin in self.nodes.sink_ids() {
            let newly_reached: Vec<SinkId> = {
                let Some(node) = self.nodes.get(origin) else { continue };
                let before = previous.get(&origin).unwrap_or(&empty);
                node.routing_table
                    .keys()
                    .copied()
                    .filter(|s| !before.contains(s))
                    .collect()
            };
            for target in newly_reached {
                self.replay_catalog(origin, target);
            }
        }
    }

    /// Push `origin`'s triages that `target` is missing along the
    /// next-hops `origin` has for `target`, respecting the suppression map.
    fn replay_catalog(&mut self, origin: SinkId, target: SinkId) {
        let plan: Vec<(TriageId, Severity, Vec<NodeId>)> = {
            let (Some(node), Some(sink)) = (self.nodes.get(origin), self.nodes.get(target)) else {
                return;
            };
            let Some(entry) = node.routing_table.get(&target) else {
                return;
            };
            let hops: Vec<NodeId> = entry.next_hops.keys().copied().collect();
            node.triage_store
                .iter()
                .filter(|&(&t, _)| !sink.has_seen(t) && !node.all_targeted(t, [&target]))
                .map(|(&t, &sev)| (t, sev, hops.clone()))
                .collect()
        };
        if plan.is_empty() {
            return;
        }
        debug!("sink {origin}: replaying {} triage(s) toward new sink {target}", plan.len());
        for (triage, severity, hops) in plan {
            for to in hops {
                self.emit(origin, to, MessageKind::Triage, Some(TriagePayload { triage, severity }));
            }
            if let Some(node) = self.nodes.get_mut(origin) {
                node.mark_targeted(triage, [target]);
            }
        }
    }
}
