//! The message pipeline: send, advance, deliver, forward, flush.
//!
//! Two dedup disciplines coexist and must not be collapsed:
//!
//! - **flooding / inactive**: a triage already in the node's store is
//!   dropped on arrival before anything else happens — the strict loop
//!   guard that bounds flooding.
//! - **intelligent**: duplicates are accepted (multi-path within the
//!   severity cap is the point); the per-sink suppression map decides
//!   whether a forward would reach any sink not already attempted.

use log::{debug, trace};

use foors_core::{MessageKind, NodeId, RoutingMode, Severity, TriageId};
use foors_node::QueuedTriage;
use foors_routing::{select_targets, LinkLoad};

use crate::message::{Message, TriagePayload};
use crate::model::MeshModel;

impl MeshModel {
    // ── Emission ──────────────────────────────────────────────────────────

    /// Create one message on the `from → to` link.
    ///
    /// Every call site derives `to` from the current neighbor set, so a
    /// non-neighbor target is an engine bug, not churn.
    pub(crate) fn emit(
        &mut self,
        from:   NodeId,
        to:     NodeId,
        kind:   MessageKind,
        triage: Option<TriagePayload>,
    ) {
        debug_assert_eq!(kind == MessageKind::Triage, triage.is_some());
        debug_assert!(
            self.nodes.get(from).is_some_and(|n| n.neighbors.contains(&to)),
            "emission target {to} is not a neighbor of {from}"
        );
        let id = foors_core::MessageId(self.next_message_id);
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            from,
            to,
            progress: 0.0,
            speed: self.config.default_message_speed,
            created_at: self.clock.now(),
            kind,
            triage,
            spawn_tick: self.tick_seq,
        });
    }

    /// In-flight message counts per directed link, for the selector's
    /// load tie-break.
    pub(crate) fn link_loads(&self) -> LinkLoad {
        let mut loads = LinkLoad::default();
        for m in &self.messages {
            if m.is_in_flight() {
                *loads.entry((m.from, m.to)).or_insert(0) += 1;
            }
        }
        loads
    }

    // ── Send ──────────────────────────────────────────────────────────────

    /// Originate a triage at `from`.  Queues instead of emitting when the
    /// node is isolated.  Returns the allocated ID (`None` for unknown
    /// nodes).
    pub(crate) fn send_triage(&mut self, from: NodeId, severity: Severity) -> Option<TriageId> {
        let now = self.clock.now();
        let triage = TriageId(self.next_triage_id);

        let sinks_targeted = {
            let node = self.nodes.get_mut(from)?;
            node.record_triage(triage, severity);
            if node.is_sink() {
                self.sink_seen.insert(triage);
            }
            if node.neighbors.is_empty() {
                node.triage_queue.push(QueuedTriage { triage, severity, queued_at: now });
                trace!("{from}: isolated, queued {triage}");
                self.next_triage_id += 1;
                return Some(triage);
            }
            node.sinks_being_targeted()
        };
        self.next_triage_id += 1;

        let loads = self.link_loads();
        let targets = select_targets(
            &self.nodes,
            from,
            None,
            MessageKind::Triage,
            Some(severity),
            &loads,
            now,
            self.config.route_expiry_ms,
        );
        for &to in &targets {
            self.emit(from, to, MessageKind::Triage, Some(TriagePayload { triage, severity }));
        }
        if let Some(node) = self.nodes.get_mut(from) {
            node.mark_targeted(triage, sinks_targeted);
        }
        Some(triage)
    }

    /// Originate a plain message at `from`.  Isolated nodes emit nothing —
    /// only triages queue.
    pub(crate) fn send_normal(&mut self, from: NodeId) {
        let now = self.clock.now();
        let loads = self.link_loads();
        let targets = select_targets(
            &self.nodes,
            from,
            None,
            MessageKind::Normal,
            None,
            &loads,
            now,
            self.config.route_expiry_ms,
        );
        for &to in &targets {
            self.emit(from, to, MessageKind::Normal, None);
        }
    }

    // ── Advance and deliver ───────────────────────────────────────────────

    /// Progress every message spawned before this tick; deliver the ones
    /// that crossed 1, in insertion order; then drop delivered messages.
    pub(crate) fn advance_messages(&mut self, dt_secs: f64) {
        let running_tick = self.tick_seq;
        let mut arrivals: Vec<usize> = Vec::new();
        for (i, m) in self.messages.iter_mut().enumerate() {
            if m.spawn_tick == running_tick {
                continue; // spawned within this tick; eligible next tick
            }
            m.progress += m.speed * dt_secs;
            if m.progress >= 1.0 {
                arrivals.push(i);
            }
        }

        // Arrival processing may append forwards, never reorder or remove,
        // so the collected indices stay valid.
        for i in arrivals {
            let msg = self.messages[i];
            self.deliver(msg);
        }
        self.messages.retain(|m| m.is_in_flight());
    }

    /// Process one arrival: record, dedup, queue-or-forward.
    pub(crate) fn deliver(&mut self, msg: Message) {
        let now = self.clock.now();
        let Some(node) = self.nodes.get_mut(msg.to) else {
            return; // receiver vanished mid-flight
        };
        node.last_message_received_at = Some(now);
        let mode = node.routing_state.mode;

        if let Some(p) = msg.triage {
            if mode.floods() && node.has_seen(p.triage) {
                trace!("{}: duplicate {} under {}, dropped", msg.to, p.triage, mode);
                return;
            }
            node.record_triage(p.triage, p.severity);
            if node.is_sink() {
                self.sink_seen.insert(p.triage);
            }
            if node.neighbors.is_empty() {
                node.triage_queue.push(QueuedTriage {
                    triage:    p.triage,
                    severity:  p.severity,
                    queued_at: now,
                });
                return;
            }
        }
        let sinks_targeted = node.sinks_being_targeted();

        let severity = msg.triage.map(|p| p.severity);
        let loads = self.link_loads();
        let targets = select_targets(
            &self.nodes,
            msg.to,
            Some(msg.from),
            msg.kind,
            severity,
            &loads,
            now,
            self.config.route_expiry_ms,
        );
        if targets.is_empty() {
            return; // unreachable forward: silent drop
        }

        // Per-sink suppression, intelligent mode only: when every sink this
        // node would aim at has already been attempted for this triage,
        // forwarding again adds nothing.
        if let Some(p) = msg.triage {
            if mode == RoutingMode::Intelligent {
                let node = self.nodes.get(msg.to).expect("receiver checked above");
                if node.all_targeted(p.triage, sinks_targeted.iter()) {
                    trace!("{}: {} already pushed toward every reachable sink", msg.to, p.triage);
                    return;
                }
            }
        }

        for &to in &targets {
            self.emit(msg.to, to, msg.kind, msg.triage);
        }
        if let Some(p) = msg.triage {
            if let Some(node) = self.nodes.get_mut(msg.to) {
                node.mark_targeted(p.triage, sinks_targeted);
            }
        }
    }

    // ── Queue flush ───────────────────────────────────────────────────────

    /// Flood the queued triages of every node that just regained a link.
    ///
    /// Deliberately not routed through the selector: within the flush tick
    /// the routing tables may not yet reflect whatever topology made the
    /// node reachable.  The queue is cleared before emitting so a flush
    /// cannot recurse within one tick.
    pub(crate) fn flush_queues(&mut self, reconnected: &[NodeId]) {
        for &id in reconnected {
            let (queued, peers) = {
                let Some(node) = self.nodes.get_mut(id) else { continue };
                if node.triage_queue.is_empty() || node.neighbors.is_empty() {
                    continue;
                }
                let queued = std::mem::take(&mut node.triage_queue);
                let peers: Vec<NodeId> = node.neighbors.iter().copied().collect();
                (queued, peers)
            };
            debug!("{id}: reconnected, flushing {} queued triage(s)", queued.len());
            for q in queued {
                for &to in &peers {
                    self.emit(
                        id,
                        to,
                        MessageKind::Triage,
                        Some(TriagePayload { triage: q.triage, severity: q.severity }),
                    );
                }
            }
        }
    }
}
