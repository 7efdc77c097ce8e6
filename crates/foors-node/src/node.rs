//! The `Node` aggregate: all per-node mutable state.
//!
//! A node is either a *source* (originates triages) or a *sink* (collects
//! them); both kinds route for their peers.  All relations to other nodes
//! are stored as `NodeId`s — the arena in [`store`](crate::store) owns the
//! nodes themselves.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use foors_core::{
    FloodingReason, NodeId, NodeKind, RoutingMode, Severity, SinkId, TimeMs, TriageId, Vec2,
};

use crate::routes::{InactiveTable, RoutingTable};

// ── QueuedTriage ─────────────────────────────────────────────────────────────

/// A triage held back because the node had no neighbors at send time.
/// Flushed by flooding the moment any link appears.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedTriage {
    pub triage:    TriageId,
    pub severity:  Severity,
    pub queued_at: TimeMs,
}

// ── RoutingState ─────────────────────────────────────────────────────────────

/// The node's current routing mode plus the route counts that produced it.
///
/// Recomputed by the mode classifier after every routing pass;
/// `last_state_change` moves only on actual mode transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingState {
    pub mode:              RoutingMode,
    pub active_routes:     usize,
    pub expired_routes:    usize,
    pub inactive_routes:   usize,
    pub flooding_reason:   Option<FloodingReason>,
    pub last_state_change: TimeMs,
}

impl Default for RoutingState {
    fn default() -> Self {
        Self {
            mode:              RoutingMode::NoConnections,
            active_routes:     0,
            expired_routes:    0,
            inactive_routes:   0,
            flooding_reason:   Some(FloodingReason::NoConnections),
            last_state_change: TimeMs::ZERO,
        }
    }
}

// ── Node ─────────────────────────────────────────────────────────────────────

/// All mutable state of one mesh participant.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:   NodeId,
    pub kind: NodeKind,

    // ── Kinematics ────────────────────────────────────────────────────────
    pub position: Vec2,
    pub velocity: Vec2,

    /// Visual body radius.  Rendering only; plays no role in link formation.
    pub radius: f64,

    /// Link eligibility radius.  A link forms when the pair distance is
    /// within the larger of the two nodes' connection radii.
    pub connection_radius: f64,

    // ── Topology ──────────────────────────────────────────────────────────
    /// Symmetric neighbor set, rebuilt from positions every tick.
    pub neighbors: BTreeSet<NodeId>,

    // ── Triage state ──────────────────────────────────────────────────────
    /// Every triage this node has seen, with its severity.  The dedup guard
    /// and the replay catalog.
    pub triage_store: BTreeMap<TriageId, Severity>,

    /// Triages awaiting reconnection, in arrival order.
    pub triage_queue: Vec<QueuedTriage>,

    /// `triage → sinks this node has already pushed it toward`.  A
    /// suppression structure, never a delivery record.
    pub sent_triages_to_sinks: FxHashMap<TriageId, BTreeSet<SinkId>>,

    // ── Routing state ─────────────────────────────────────────────────────
    /// Active routes, one entry per reachable sink.
    pub routing_table: RoutingTable,

    /// Demoted routes in their grace period.  Disjoint from
    /// `routing_table` per sink.
    pub inactive_routes: InactiveTable,

    pub routing_state: RoutingState,

    // ── Observability ─────────────────────────────────────────────────────
    pub last_message_received_at: Option<TimeMs>,
}

impl Node {
    /// Default visual radius for new nodes.
    pub const DEFAULT_RADIUS: f64 = 0.3;

    pub fn new(id: NodeId, kind: NodeKind, position: Vec2, connection_radius: f64) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            radius: Self::DEFAULT_RADIUS,
            connection_radius,
            neighbors: BTreeSet::new(),
            triage_store: BTreeMap::new(),
            triage_queue: Vec::new(),
            sent_triages_to_sinks: FxHashMap::default(),
            routing_table: BTreeMap::new(),
            inactive_routes: BTreeMap::new(),
            routing_state: RoutingState::default(),
            last_message_received_at: None,
        }
    }

    #[inline]
    pub fn is_sink(&self) -> bool {
        self.kind.is_sink()
    }

    /// One straight-line integration step.
    #[inline]
    pub fn apply_motion(&mut self, dt_secs: f64) {
        self.position = self.position.advanced_by(self.velocity, dt_secs);
    }

    /// `true` if this node has seen `triage` before.
    #[inline]
    pub fn has_seen(&self, triage: TriageId) -> bool {
        self.triage_store.contains_key(&triage)
    }

    /// Record a triage sighting.  Idempotent; returns `true` when the
    /// triage was new to this node.
    pub fn record_triage(&mut self, triage: TriageId, severity: Severity) -> bool {
        self.triage_store.insert(triage, severity).is_none()
    }

    /// The sinks an emission from this node is aimed at right now: itself
    /// when it is a sink, plus every sink in its routing table.
    pub fn sinks_being_targeted(&self) -> BTreeSet<SinkId> {
        let mut sinks: BTreeSet<SinkId> = self.routing_table.keys().copied().collect();
        if self.is_sink() {
            sinks.insert(self.id);
        }
        sinks
    }

    /// Record that `triage` has been pushed toward each sink in `sinks`.
    pub fn mark_targeted<I>(&mut self, triage: TriageId, sinks: I)
    where
        I: IntoIterator<Item = SinkId>,
    {
        self.sent_triages_to_sinks
            .entry(triage)
            .or_default()
            .extend(sinks);
    }

    /// `true` if every sink in `sinks` is already recorded as targeted for
    /// `triage`.  Vacuously true for an empty set.
    pub fn all_targeted<'a, I>(&self, triage: TriageId, sinks: I) -> bool
    where
        I: IntoIterator<Item = &'a SinkId>,
    {
        match self.sent_triages_to_sinks.get(&triage) {
            Some(t) => sinks.into_iter().all(|s| t.contains(s)),
            None => sinks.into_iter().next().is_none(),
        }
    }
}
